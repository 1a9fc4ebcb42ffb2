// @generated manually to match the persisted-state layout this crate targets.

pub mod sql_types {
    #[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "capability_permission"))]
    pub struct CapabilityPermission;

    #[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "capability_scope_type"))]
    pub struct CapabilityScopeType;

    #[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "append_type"))]
    pub struct AppendType;

    #[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "append_status"))]
    pub struct AppendStatus;

    #[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "delivery_status"))]
    pub struct DeliveryStatus;

    #[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "api_key_scope"))]
    pub struct ApiKeyScope;
}

diesel::table! {
    workspaces (id) {
        id -> Uuid,
        name -> Text,
        last_activity_at -> Timestamptz,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use crate::schema::sql_types::{CapabilityPermission, CapabilityScopeType};

    capability_keys (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        prefix -> Text,
        key_hash -> Text,
        permission -> CapabilityPermission,
        scope_type -> CapabilityScopeType,
        scope_path -> Nullable<Text>,
        bound_author -> Nullable<Text>,
        wip_limit -> Nullable<Int4>,
        allowed_types -> Nullable<Array<Nullable<Text>>>,
        display_name -> Nullable<Text>,
        created_at -> Timestamptz,
        expires_at -> Nullable<Timestamptz>,
        revoked_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    rate_limits (key) {
        key -> Text,
        count -> Int4,
        window_start -> Int8,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use crate::schema::sql_types::CapabilityScopeType;

    webhooks (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        scope_type -> CapabilityScopeType,
        scope_path -> Nullable<Text>,
        url -> Text,
        events -> Array<Nullable<Text>>,
        secret_hash -> Nullable<Text>,
        recursive -> Bool,
        failure_count -> Int4,
        disabled_at -> Nullable<Timestamptz>,
        last_triggered_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use crate::schema::sql_types::DeliveryStatus;

    webhook_deliveries (id) {
        id -> Uuid,
        webhook_id -> Uuid,
        event -> Text,
        status -> DeliveryStatus,
        response_code -> Nullable<Int4>,
        duration_ms -> Nullable<Int4>,
        error -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    files (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        created_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use crate::schema::sql_types::{AppendType, AppendStatus};

    appends (id) {
        id -> Uuid,
        file_id -> Uuid,
        workspace_id -> Uuid,
        append_id -> Text,
        author -> Text,
        #[sql_name = "type"]
        type_ -> AppendType,
        status -> Nullable<AppendStatus>,
        priority -> Nullable<Text>,
        labels -> Nullable<Jsonb>,
        #[sql_name = "ref"]
        ref_ -> Nullable<Text>,
        expires_at -> Nullable<Timestamptz>,
        content_preview -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use crate::schema::sql_types::ApiKeyScope;

    api_keys (id) {
        id -> Uuid,
        workspace_id -> Nullable<Uuid>,
        prefix -> Text,
        key_hash -> Text,
        scopes -> Array<Nullable<ApiKeyScope>>,
        display_name -> Nullable<Text>,
        created_at -> Timestamptz,
        expires_at -> Nullable<Timestamptz>,
        revoked_at -> Nullable<Timestamptz>,
        last_used_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(capability_keys -> workspaces (workspace_id));
diesel::joinable!(webhooks -> workspaces (workspace_id));
diesel::joinable!(webhook_deliveries -> webhooks (webhook_id));
diesel::joinable!(appends -> workspaces (workspace_id));
diesel::joinable!(files -> workspaces (workspace_id));

diesel::allow_tables_to_appear_in_same_query!(
    api_keys,
    appends,
    capability_keys,
    files,
    rate_limits,
    webhook_deliveries,
    webhooks,
    workspaces,
);
