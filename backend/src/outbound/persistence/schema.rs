//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// One planned gathering and its lifecycle status.
    hangouts (id) {
        id -> Int8,
        creator_id -> Uuid,
        title -> Varchar,
        /// Kebab-case `HangoutStatus`.
        status -> Varchar,
        scheduled_date -> Nullable<Date>,
        scheduled_start -> Nullable<Time>,
        scheduled_end -> Nullable<Time>,
        chosen_place_id -> Nullable<Int8>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Membership rows; the location columns are set together or not at all.
    hangout_participants (hangout_id, user_id) {
        hangout_id -> Int8,
        user_id -> Uuid,
        invite_status -> Varchar,
        flow_status -> Varchar,
        start_address -> Nullable<Text>,
        transport_mode -> Nullable<Varchar>,
        travel_minutes -> Nullable<Int4>,
    }
}

diesel::table! {
    time_options (id) {
        id -> Int8,
        hangout_id -> Int8,
        option_date -> Date,
        start_time -> Time,
        end_time -> Time,
    }
}

diesel::table! {
    time_votes (user_id, time_option_id) {
        user_id -> Uuid,
        time_option_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    place_recommendations (id) {
        id -> Int8,
        hangout_id -> Int8,
        name -> Varchar,
        address -> Text,
        longitude -> Float8,
        latitude -> Float8,
    }
}

diesel::table! {
    place_votes (user_id, recommendation_id) {
        user_id -> Uuid,
        recommendation_id -> Int8,
        place_rank -> Int4,
    }
}

diesel::table! {
    notifications (id) {
        id -> Int8,
        recipient_id -> Uuid,
        sender_id -> Nullable<Uuid>,
        hangout_id -> Nullable<Int8>,
        kind -> Varchar,
        message -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(hangout_participants -> hangouts (hangout_id));
diesel::joinable!(time_options -> hangouts (hangout_id));
diesel::joinable!(time_votes -> time_options (time_option_id));
diesel::joinable!(place_recommendations -> hangouts (hangout_id));
diesel::joinable!(place_votes -> place_recommendations (recommendation_id));

diesel::allow_tables_to_appear_in_same_query!(
    hangouts,
    hangout_participants,
    time_options,
    time_votes,
    place_recommendations,
    place_votes,
    notifications,
);
