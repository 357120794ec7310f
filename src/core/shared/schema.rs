diesel::table! {
    activity_events (id) {
        id -> Int8,
        touchpoint_id -> Varchar,
        customer_org_id -> Varchar,
        account_id -> Nullable<Varchar>,
        timestamp -> Timestamptz,
        channel -> Nullable<Varchar>,
        status -> Nullable<Varchar>,
        direction -> Nullable<Varchar>,
        activity -> Nullable<Text>,
        people -> Jsonb,
        involved_team_ids -> Jsonb,
    }
}

diesel::table! {
    persons (id) {
        id -> Varchar,
        customer_org_id -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        email -> Nullable<Varchar>,
        title -> Nullable<Varchar>,
        company -> Nullable<Varchar>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(activity_events, persons);
