//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts with credentials and the per-user group index.
    users (id) {
        id -> Uuid,
        /// Lower-cased e-mail; unique.
        email -> Text,
        /// PHC-formatted Argon2id hash.
        password_hash -> Text,
        role -> Text,
        name -> Text,
        bio -> Nullable<Text>,
        profile_picture -> Nullable<Text>,
        /// Denormalised copy of group rosters, updated best-effort.
        group_ids -> Array<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Groups with their embedded roster and moderation state.
    groups (id) {
        id -> Uuid,
        name -> Text,
        description -> Text,
        image -> Nullable<Text>,
        is_private -> Bool,
        invite_code -> Text,
        creator_id -> Uuid,
        /// JSON array of `{ "user": uuid, "role": "owner" | "admin" | "member" }`.
        members -> Jsonb,
        /// JSON array of `{ "user": uuid, "requestedAt": timestamp }`.
        pending_requests -> Jsonb,
        moderation_status -> Text,
        moderated_by -> Nullable<Uuid>,
        moderated_at -> Nullable<Timestamptz>,
        rejection_reason -> Nullable<Text>,
        /// Optimistic concurrency counter.
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    recipes (id) {
        id -> Uuid,
        author_id -> Uuid,
        /// Not a foreign key: deleting a group detaches its recipes afterwards.
        group_id -> Nullable<Uuid>,
        title -> Text,
        description -> Text,
        ingredients -> Jsonb,
        steps -> Jsonb,
        prep_time -> Int4,
        cook_time -> Int4,
        servings -> Int4,
        category -> Text,
        difficulty -> Text,
        tags -> Array<Text>,
        image -> Nullable<Text>,
        is_private -> Bool,
        moderation_status -> Text,
        moderated_by -> Nullable<Uuid>,
        moderated_at -> Nullable<Timestamptz>,
        rejection_reason -> Nullable<Text>,
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(groups, recipes, users);
