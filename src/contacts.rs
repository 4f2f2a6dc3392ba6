/// Contacts domain
///
/// Owner-scoped contact records behind the access-token middleware. The
/// store is a key-value mapping like the user store; every lookup is
/// scoped to the owner so one user can never see another's contacts.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Contact record
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub email: String,
    pub phone_number: Option<String>,
    pub other_information: Option<String>,
    /// Owning user's email (token subject)
    #[serde(skip_serializing)]
    pub owner: String,
}

/// Client-supplied contact fields for create and update
#[derive(Debug, Clone, Deserialize)]
pub struct ContactData {
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub email: String,
    pub phone_number: Option<String>,
    pub other_information: Option<String>,
}

/// Optional search filter; a contact matches when any provided field
/// matches exactly.
#[derive(Debug, Default, Deserialize)]
pub struct ContactFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl ContactFilter {
    fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.email.is_none()
    }

    fn matches(&self, contact: &Contact) -> bool {
        if self.is_empty() {
            return true;
        }
        self.first_name.as_deref() == Some(contact.first_name.as_str())
            || self.last_name.as_deref() == Some(contact.last_name.as_str())
            || self.email.as_deref() == Some(contact.email.as_str())
    }
}

pub struct ContactStore {
    contacts: Mutex<HashMap<Uuid, Contact>>,
}

impl Default for ContactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactStore {
    pub fn new() -> Self {
        Self {
            contacts: Mutex::new(HashMap::new()),
        }
    }

    pub fn create(&self, owner: &str, data: ContactData) -> Contact {
        let contact = Contact {
            id: Uuid::new_v4(),
            first_name: data.first_name,
            last_name: data.last_name,
            birthday: data.birthday,
            email: data.email,
            phone_number: data.phone_number,
            other_information: data.other_information,
            owner: owner.to_string(),
        };
        self.contacts
            .lock()
            .unwrap()
            .insert(contact.id, contact.clone());
        contact
    }

    pub fn list(&self, owner: &str, filter: &ContactFilter) -> Vec<Contact> {
        let contacts = self.contacts.lock().unwrap();
        let mut result: Vec<Contact> = contacts
            .values()
            .filter(|c| c.owner == owner && filter.matches(c))
            .cloned()
            .collect();
        result.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));
        result
    }

    pub fn get(&self, owner: &str, id: Uuid) -> Option<Contact> {
        let contacts = self.contacts.lock().unwrap();
        contacts.get(&id).filter(|c| c.owner == owner).cloned()
    }

    pub fn update(&self, owner: &str, id: Uuid, data: ContactData) -> Option<Contact> {
        let mut contacts = self.contacts.lock().unwrap();
        let contact = contacts.get_mut(&id).filter(|c| c.owner == owner)?;

        contact.first_name = data.first_name;
        contact.last_name = data.last_name;
        contact.birthday = data.birthday;
        contact.email = data.email;
        contact.phone_number = data.phone_number;
        contact.other_information = data.other_information;
        Some(contact.clone())
    }

    pub fn delete(&self, owner: &str, id: Uuid) -> bool {
        let mut contacts = self.contacts.lock().unwrap();
        match contacts.get(&id) {
            Some(c) if c.owner == owner => {
                contacts.remove(&id);
                true
            }
            _ => false,
        }
    }

    /// Contacts whose birthday (year-agnostic) falls within the next
    /// `days_ahead` days, today included.
    pub fn upcoming_birthdays(&self, owner: &str, today: NaiveDate, days_ahead: i64) -> Vec<Contact> {
        let contacts = self.contacts.lock().unwrap();
        let mut result: Vec<(i64, Contact)> = contacts
            .values()
            .filter(|c| c.owner == owner)
            .filter_map(|c| {
                let birthday = c.birthday?;
                let next = next_occurrence(birthday, today)?;
                let in_days = (next - today).num_days();
                if in_days <= days_ahead {
                    Some((in_days, c.clone()))
                } else {
                    None
                }
            })
            .collect();
        result.sort_by_key(|(in_days, _)| *in_days);
        result.into_iter().map(|(_, c)| c).collect()
    }
}

/// Next calendar occurrence of a birthday on or after `today`.
/// February 29 birthdays fall on March 1 in non-leap years.
fn next_occurrence(birthday: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let in_year = |year: i32| {
        NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
    };

    let this_year = in_year(today.year())?;
    if this_year >= today {
        Some(this_year)
    } else {
        in_year(today.year() + 1)
    }
}
