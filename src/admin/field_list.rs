//! Ordered editors for repeatable sub-records (extra emails, contacts)

use crate::models::Contact;

/// A record that can be edited one field at a time
pub trait EditableRecord: Clone + Default {
    type Field: Copy;

    /// Copy of `self` with `field` replaced by `value`
    fn with_field(&self, field: Self::Field, value: &str) -> Self;
}

impl EditableRecord for String {
    type Field = ();

    fn with_field(&self, _field: (), value: &str) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Role,
    Email,
    Phone,
}

impl ContactField {
    pub const ALL: [ContactField; 4] = [
        ContactField::Name,
        ContactField::Role,
        ContactField::Email,
        ContactField::Phone,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ContactField::Name => "Name",
            ContactField::Role => "Role",
            ContactField::Email => "Email",
            ContactField::Phone => "Phone",
        }
    }

    pub fn get<'a>(&self, contact: &'a Contact) -> &'a str {
        match self {
            ContactField::Name => &contact.name,
            ContactField::Role => &contact.role,
            ContactField::Email => &contact.email,
            ContactField::Phone => &contact.phone,
        }
    }
}

impl EditableRecord for Contact {
    type Field = ContactField;

    fn with_field(&self, field: ContactField, value: &str) -> Self {
        let mut next = self.clone();
        let slot = match field {
            ContactField::Name => &mut next.name,
            ContactField::Role => &mut next.role,
            ContactField::Email => &mut next.email,
            ContactField::Phone => &mut next.phone,
        };
        *slot = value.to_string();
        next
    }
}

/// Ordered sequence of records edited by index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldList<T> {
    items: Vec<T>,
}

impl<T: EditableRecord> FieldList<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Append a blank record
    pub fn add(&mut self) {
        self.items.push(T::default());
    }

    /// Replace the record at `index`; returns false when out of range
    pub fn update(&mut self, index: usize, field: T::Field, value: &str) -> bool {
        match self.items.get(index) {
            Some(current) => {
                let next = current.with_field(field, value);
                self.items[index] = next;
                true
            }
            None => false,
        }
    }

    /// Drop the record at `index`, keeping the order of the others
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.items = self
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, item)| item.clone())
            .collect();
        true
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emails(values: &[&str]) -> FieldList<String> {
        FieldList::from_vec(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_add_appends_blank_record() {
        let mut list = emails(&["a@x.test"]);
        list.add();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1).map(String::as_str), Some(""));
    }

    #[test]
    fn test_add_then_remove_preserves_order() {
        for index in 0..4 {
            let mut list = emails(&["a@x.test", "b@x.test", "c@x.test"]);
            list.add();
            list.update(3, (), "d@x.test");
            assert!(list.remove(index));

            let mut expected = vec!["a@x.test", "b@x.test", "c@x.test", "d@x.test"];
            expected.remove(index);
            assert_eq!(list.len(), 3);
            assert_eq!(list.to_vec(), expected);
        }
    }

    #[test]
    fn test_update_replaces_single_record() {
        let mut list = emails(&["a@x.test", "b@x.test"]);
        assert!(list.update(1, (), "z@x.test"));
        assert_eq!(list.to_vec(), vec!["a@x.test", "z@x.test"]);
        assert!(!list.update(2, (), "nope"));
        assert!(!list.remove(5));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_contact_field_update() {
        let mut contacts: FieldList<Contact> = FieldList::new();
        contacts.add();
        contacts.add();
        contacts.update(1, ContactField::Email, "jo@acme.test");
        contacts.update(1, ContactField::Name, "Jo");

        let second = contacts.get(1).unwrap();
        assert_eq!(second.name, "Jo");
        assert_eq!(second.email, "jo@acme.test");
        assert_eq!(contacts.get(0), Some(&Contact::default()));
        assert_eq!(ContactField::Email.get(second), "jo@acme.test");
    }
}
