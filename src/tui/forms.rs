//! Keyboard layout of the entity forms
//!
//! A form is a flat list of focusable slots. Each slot maps to one value of
//! the draft; repeatable rows (extra emails, contacts) expand into one slot
//! per row.

use crate::admin::{ClientDraft, CommonFields, ContactField, Draft, SupplierDraft};
use crate::models::weekday_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountingField {
    Name,
    Email,
    Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    Closed,
    Open,
    Close,
}

/// One focusable row of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Name,
    Email,
    ExtraEmail(usize),
    Phone,
    PaymentTerms,
    Siret,
    VatNumber,
    Vat,
    CustomVat,
    Country,
    Services,
    CoverageZones,
    Contact(usize, ContactField),
    Accounting(AccountingField),
    Day(usize, DayPart),
}

/// How a slot reacts to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Text,
    /// Left/Right move through a fixed set of values
    Choice,
    /// Space flips the value
    Toggle,
}

impl Slot {
    pub fn kind(&self) -> SlotKind {
        match self {
            Slot::Vat | Slot::Country => SlotKind::Choice,
            Slot::Day(_, DayPart::Closed) => SlotKind::Toggle,
            _ => SlotKind::Text,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Slot::Name => "Name *".to_string(),
            Slot::Email => "Email *".to_string(),
            Slot::ExtraEmail(i) => format!("Extra email {}", i + 1),
            Slot::Phone => "Phone".to_string(),
            Slot::PaymentTerms => "Payment terms".to_string(),
            Slot::Siret => "SIRET".to_string(),
            Slot::VatNumber => "VAT number".to_string(),
            Slot::Vat => "VAT rate".to_string(),
            Slot::CustomVat => "Custom VAT %".to_string(),
            Slot::Country => "Country".to_string(),
            Slot::Services => "Services".to_string(),
            Slot::CoverageZones => "Coverage zones".to_string(),
            Slot::Contact(i, field) => format!("Contact {} {}", i + 1, field.as_str().to_lowercase()),
            Slot::Accounting(AccountingField::Name) => "Accounting name".to_string(),
            Slot::Accounting(AccountingField::Email) => "Accounting email".to_string(),
            Slot::Accounting(AccountingField::Phone) => "Accounting phone".to_string(),
            Slot::Day(i, part) => {
                let day = crate::models::WEEK.get(*i).map(|d| weekday_label(*d)).unwrap_or("?");
                match part {
                    DayPart::Closed => day.to_string(),
                    DayPart::Open => format!("{} opens", day),
                    DayPart::Close => format!("{} closes", day),
                }
            }
        }
    }
}

/// Form drafts the TUI knows how to lay out
pub trait FormLayout: Draft {
    /// Focusable slots in display order
    fn slots(&self) -> Vec<Slot>;

    /// Current text of a text slot
    fn value(&self, slot: Slot) -> Option<String>;

    /// Replace the text of a text slot
    fn set_value(&mut self, slot: Slot, value: &str);

    /// Flip a toggle slot
    fn toggle(&mut self, _slot: Slot) {}

    fn add_email(&mut self) {
        self.common_mut().emails.add();
    }

    /// Append a contact row; false when the form has no contacts section
    fn add_contact(&mut self) -> bool {
        false
    }

    /// Remove the repeatable row the slot belongs to
    fn remove_row(&mut self, slot: Slot) -> bool;

    fn has_contacts(&self) -> bool {
        false
    }
}

fn common_slots(common: &CommonFields) -> Vec<Slot> {
    let mut slots = vec![Slot::Name, Slot::Email];
    slots.extend((0..common.emails.len()).map(Slot::ExtraEmail));
    slots.extend([Slot::Phone, Slot::PaymentTerms, Slot::Siret, Slot::VatNumber, Slot::Vat]);
    if common.vat.is_custom() {
        slots.push(Slot::CustomVat);
    }
    slots.push(Slot::Country);
    slots
}

fn common_value(common: &CommonFields, slot: Slot) -> Option<String> {
    let value = match slot {
        Slot::Name => common.name.clone(),
        Slot::Email => common.email.clone(),
        Slot::ExtraEmail(i) => common.emails.get(i)?.clone(),
        Slot::Phone => common.phone.clone(),
        Slot::PaymentTerms => common.payment_terms.clone(),
        Slot::Siret => common.siret.clone(),
        Slot::VatNumber => common.vat_number.clone(),
        Slot::CustomVat => common.vat.custom_value().to_string(),
        Slot::Vat => common.vat.display(),
        _ => return None,
    };
    Some(value)
}

fn set_common_value(common: &mut CommonFields, slot: Slot, value: &str) {
    match slot {
        Slot::Name => common.name = value.to_string(),
        Slot::Email => common.email = value.to_string(),
        Slot::ExtraEmail(i) => {
            common.emails.update(i, (), value);
        }
        Slot::Phone => common.phone = value.to_string(),
        Slot::PaymentTerms => common.payment_terms = value.to_string(),
        Slot::Siret => common.siret = value.to_string(),
        Slot::VatNumber => common.vat_number = value.to_string(),
        Slot::CustomVat => common.vat.set_custom_value(value),
        _ => {}
    }
}

fn remove_email(common: &mut CommonFields, slot: Slot) -> bool {
    match slot {
        Slot::ExtraEmail(i) => common.emails.remove(i),
        _ => false,
    }
}

impl FormLayout for SupplierDraft {
    fn slots(&self) -> Vec<Slot> {
        let mut slots = common_slots(&self.common);
        slots.extend([Slot::Services, Slot::CoverageZones]);
        slots
    }

    fn value(&self, slot: Slot) -> Option<String> {
        match slot {
            Slot::Services => Some(self.services.clone()),
            Slot::CoverageZones => Some(self.coverage_zones.clone()),
            _ => common_value(&self.common, slot),
        }
    }

    fn set_value(&mut self, slot: Slot, value: &str) {
        match slot {
            Slot::Services => self.services = value.to_string(),
            Slot::CoverageZones => self.coverage_zones = value.to_string(),
            _ => set_common_value(&mut self.common, slot, value),
        }
    }

    fn remove_row(&mut self, slot: Slot) -> bool {
        remove_email(&mut self.common, slot)
    }
}

impl FormLayout for ClientDraft {
    fn slots(&self) -> Vec<Slot> {
        let mut slots = common_slots(&self.common);
        for i in 0..self.contacts.len() {
            slots.extend(ContactField::ALL.iter().map(|f| Slot::Contact(i, *f)));
        }
        slots.extend([
            Slot::Accounting(AccountingField::Name),
            Slot::Accounting(AccountingField::Email),
            Slot::Accounting(AccountingField::Phone),
        ]);
        for (i, day) in self.hours.iter().enumerate() {
            slots.push(Slot::Day(i, DayPart::Closed));
            if !day.closed {
                slots.push(Slot::Day(i, DayPart::Open));
                slots.push(Slot::Day(i, DayPart::Close));
            }
        }
        slots
    }

    fn value(&self, slot: Slot) -> Option<String> {
        match slot {
            Slot::Contact(i, field) => self.contacts.get(i).map(|c| field.get(c).to_string()),
            Slot::Accounting(AccountingField::Name) => Some(self.accounting.name.clone()),
            Slot::Accounting(AccountingField::Email) => Some(self.accounting.email.clone()),
            Slot::Accounting(AccountingField::Phone) => Some(self.accounting.phone.clone()),
            Slot::Day(i, part) => {
                let day = self.hours.get(i)?;
                Some(match part {
                    DayPart::Closed if day.closed => "Closed".to_string(),
                    DayPart::Closed => "Open".to_string(),
                    DayPart::Open => day.open.clone(),
                    DayPart::Close => day.close.clone(),
                })
            }
            _ => common_value(&self.common, slot),
        }
    }

    fn set_value(&mut self, slot: Slot, value: &str) {
        match slot {
            Slot::Contact(i, field) => {
                self.contacts.update(i, field, value);
            }
            Slot::Accounting(AccountingField::Name) => self.accounting.name = value.to_string(),
            Slot::Accounting(AccountingField::Email) => self.accounting.email = value.to_string(),
            Slot::Accounting(AccountingField::Phone) => self.accounting.phone = value.to_string(),
            Slot::Day(i, DayPart::Open) => {
                if let Some(day) = self.hours.get_mut(i) {
                    day.open = value.to_string();
                }
            }
            Slot::Day(i, DayPart::Close) => {
                if let Some(day) = self.hours.get_mut(i) {
                    day.close = value.to_string();
                }
            }
            _ => set_common_value(&mut self.common, slot, value),
        }
    }

    fn toggle(&mut self, slot: Slot) {
        if let Slot::Day(i, DayPart::Closed) = slot {
            self.toggle_closed(i);
        }
    }

    fn add_contact(&mut self) -> bool {
        self.contacts.add();
        true
    }

    fn remove_row(&mut self, slot: Slot) -> bool {
        match slot {
            Slot::Contact(i, _) => self.contacts.remove(i),
            _ => remove_email(&mut self.common, slot),
        }
    }

    fn has_contacts(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_vat_slot_follows_choice() {
        let mut draft = SupplierDraft::default();
        assert!(!draft.slots().contains(&Slot::CustomVat));
        draft.common.vat.select_custom();
        assert!(draft.slots().contains(&Slot::CustomVat));
        draft.set_value(Slot::CustomVat, "7.5");
        assert_eq!(draft.common.vat.resolve(), 7.5);
    }

    #[test]
    fn test_extra_email_rows() {
        let mut draft = SupplierDraft::default();
        draft.add_email();
        draft.add_email();
        draft.set_value(Slot::ExtraEmail(1), "b@x.test");
        assert_eq!(draft.value(Slot::ExtraEmail(1)).as_deref(), Some("b@x.test"));

        assert!(draft.remove_row(Slot::ExtraEmail(0)));
        assert_eq!(draft.common.emails.to_vec(), vec!["b@x.test".to_string()]);
        assert!(!draft.remove_row(Slot::Name));
    }

    #[test]
    fn test_closed_days_hide_time_slots() {
        let mut draft = ClientDraft::default();
        let saturday = Slot::Day(5, DayPart::Open);
        assert!(!draft.slots().contains(&saturday));

        draft.toggle(Slot::Day(5, DayPart::Closed));
        assert!(draft.slots().contains(&saturday));
        draft.set_value(saturday, "10:00");
        assert_eq!(draft.hours[5].open, "10:00");
    }

    #[test]
    fn test_contact_rows() {
        let mut draft = ClientDraft::default();
        assert!(!SupplierDraft::default().add_contact());
        assert!(draft.add_contact());
        draft.set_value(Slot::Contact(0, ContactField::Role), "Buyer");
        assert_eq!(draft.contacts.get(0).map(|c| c.role.as_str()), Some("Buyer"));
        assert!(draft.slots().contains(&Slot::Contact(0, ContactField::Phone)));

        assert!(draft.remove_row(Slot::Contact(0, ContactField::Email)));
        assert!(draft.contacts.is_empty());
    }
}
