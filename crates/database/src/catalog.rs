//! The closed registry of tables reachable through the resource gateway.
//!
//! Every table the gateway may touch is declared here with its field
//! schema. Lookups for any other name fail; nothing is reflected from the
//! database at runtime.

/// Storage and wire kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Boolean,
    /// ISO-8601 text, rendered as ISO-8601 on read.
    Timestamp,
    /// `YYYY-MM-DD` text.
    Date,
    /// Serialized structured data, returned as nested JSON.
    Json,
}

/// A single column of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldDef {
    FieldDef { name, kind }
}

/// Static schema of one catalog entity.
#[derive(Debug, PartialEq, Eq)]
pub struct EntitySchema {
    /// Table name, also the gateway route segment.
    pub table: &'static str,
    pub fields: &'static [FieldDef],
    /// Field holding the owning principal, injected on create when absent.
    pub owner_field: Option<&'static str>,
    /// Text identifier the store generates when a create omits it.
    pub generated_id: Option<&'static str>,
}

impl EntitySchema {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the entity carries a refreshable `updated_at` column.
    pub fn tracks_updates(&self) -> bool {
        self.field("updated_at").is_some()
    }
}

use FieldKind::{Boolean, Date, Integer, Json, Text, Timestamp};

static CHATS: EntitySchema = EntitySchema {
    table: "chats",
    fields: &[
        field("id", Text),
        field("user_id", Text),
        field("title", Text),
        field("created_at", Timestamp),
        field("updated_at", Timestamp),
    ],
    owner_field: Some("user_id"),
    generated_id: Some("id"),
};

static MESSAGES: EntitySchema = EntitySchema {
    table: "messages",
    fields: &[
        field("id", Text),
        field("chat_id", Text),
        field("user_id", Text),
        field("role", Text),
        field("content", Json),
        field("created_at", Timestamp),
    ],
    owner_field: Some("user_id"),
    generated_id: Some("id"),
};

static NOTIFICATIONS: EntitySchema = EntitySchema {
    table: "notifications",
    fields: &[
        field("id", Text),
        field("user_id", Text),
        field("title", Text),
        field("body", Text),
        field("read", Boolean),
        field("read_at", Timestamp),
        field("created_at", Timestamp),
        field("updated_at", Timestamp),
    ],
    owner_field: Some("user_id"),
    generated_id: Some("id"),
};

static HELP_REQUESTS: EntitySchema = EntitySchema {
    table: "help_requests",
    fields: &[
        field("id", Text),
        field("user_id", Text),
        field("subject", Text),
        field("message", Text),
        field("created_at", Timestamp),
        field("updated_at", Timestamp),
    ],
    owner_field: Some("user_id"),
    generated_id: Some("id"),
};

static PROFILES: EntitySchema = EntitySchema {
    table: "profiles",
    fields: &[
        field("id", Text),
        field("email", Text),
        field("display_name", Text),
        field("avatar_url", Text),
        field("bio", Text),
        field("company", Text),
        field("location", Text),
        field("phone", Text),
        field("phone_verified", Boolean),
        field("plan_id", Text),
        field("created_at", Timestamp),
        field("updated_at", Timestamp),
    ],
    owner_field: None,
    generated_id: None,
};

static PLANS: EntitySchema = EntitySchema {
    table: "plans",
    fields: &[
        field("id", Text),
        field("name", Text),
        field("price_cents", Integer),
        field("credits_v1", Integer),
        field("credits_v2", Integer),
        field("credits_v3", Integer),
        field("ocr_bill_limit", Integer),
        field("ocr_bank_limit", Integer),
        field("created_at", Timestamp),
        field("updated_at", Timestamp),
    ],
    owner_field: None,
    generated_id: Some("id"),
};

static USER_CREDITS: EntitySchema = EntitySchema {
    table: "user_credits",
    fields: &[
        field("user_id", Text),
        field("v1", Integer),
        field("v2", Integer),
        field("v3", Integer),
        field("ocr_bill", Integer),
        field("ocr_bank", Integer),
        field("last_reset_month", Date),
        field("ocr_last_reset_month", Date),
        field("updated_at", Timestamp),
    ],
    owner_field: Some("user_id"),
    generated_id: None,
};

const EXTRACTION_FIELDS: &[FieldDef] = &[
    field("id", Text),
    field("user_id", Text),
    field("filename", Text),
    field("file_url", Text),
    field("data", Json),
    field("approved", Boolean),
    field("created_at", Timestamp),
    field("updated_at", Timestamp),
];

static OCR_BILL_EXTRACTIONS: EntitySchema = EntitySchema {
    table: "ocr_bill_extractions",
    fields: EXTRACTION_FIELDS,
    owner_field: Some("user_id"),
    generated_id: Some("id"),
};

static OCR_BANK_EXTRACTIONS: EntitySchema = EntitySchema {
    table: "ocr_bank_extractions",
    fields: EXTRACTION_FIELDS,
    owner_field: Some("user_id"),
    generated_id: Some("id"),
};

static CATALOG: &[&EntitySchema] = &[
    &CHATS,
    &MESSAGES,
    &NOTIFICATIONS,
    &HELP_REQUESTS,
    &PROFILES,
    &PLANS,
    &USER_CREDITS,
    &OCR_BILL_EXTRACTIONS,
    &OCR_BANK_EXTRACTIONS,
];

/// Resolve a table name to its schema. Names outside the catalog yield `None`.
pub fn resolve(table: &str) -> Option<&'static EntitySchema> {
    CATALOG.iter().copied().find(|schema| schema.table == table)
}

/// All catalog table names.
pub fn tables() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|schema| schema.table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_tables() {
        let schema = resolve("messages").unwrap();
        assert_eq!(schema.owner_field, Some("user_id"));
        assert_eq!(schema.field("content").unwrap().kind, FieldKind::Json);
        assert!(!schema.tracks_updates());

        let profiles = resolve("profiles").unwrap();
        assert!(profiles.owner_field.is_none());
        assert!(profiles.generated_id.is_none());
    }

    #[test]
    fn test_resolve_rejects_unknown() {
        assert!(resolve("users").is_none());
        assert!(resolve("sessions").is_none());
        assert!(resolve("sqlite_master").is_none());
        assert!(resolve("Chats").is_none());
    }

    #[test]
    fn test_catalog_is_closed() {
        assert_eq!(tables().count(), 9);
    }
}
