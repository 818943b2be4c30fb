use std::collections::HashSet;

/// Mutable columns of the `users` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    FirstName,
    LastName,
    Phone,
    Dob,
    Nic,
    Email,
    Gender,
    ImgLink,
    Role,
    AccountTier,
    Ratings,
    TotalOrders,
    Password,
    PasswordResetToken,
    PasswordResetExpires,
}

/// Fields touched by a single create or update, computed by the caller
/// before the record goes through the update pipeline.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    fields: HashSet<UserField>,
    is_new_record: bool,
    password_hashed: bool,
}

impl ChangeSet {
    /// A brand new record: its initial password must be hashed but is not a "change".
    pub fn for_insert() -> Self {
        let mut changes = Self {
            is_new_record: true,
            ..Self::default()
        };
        changes.mark(UserField::Password);
        changes
    }

    pub fn for_update() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, field: UserField) {
        self.fields.insert(field);
        if field == UserField::Password {
            self.password_hashed = false;
        }
    }

    pub fn contains(&self, field: UserField) -> bool {
        self.fields.contains(&field)
    }

    pub fn is_new_record(&self) -> bool {
        self.is_new_record
    }

    pub fn password_changed(&self) -> bool {
        self.contains(UserField::Password)
    }

    /// True while the password in the record is still the caller's plaintext.
    pub fn password_needs_hashing(&self) -> bool {
        self.password_changed() && !self.password_hashed
    }

    pub(crate) fn mark_password_hashed(&mut self) {
        self.password_hashed = true;
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &UserField> {
        self.fields.iter()
    }
}
