diesel::table! {
    employees (id) {
        id -> Uuid,
        seq -> Int8,
        employee_code -> Varchar,
        first_name -> Text,
        last_name -> Text,
        email -> Text,
        location -> Text,
        language -> Text,
        status -> Varchar,
        avatar -> Text,
        assigned_leads -> Int4,
        closed_leads -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    leads (id) {
        id -> Uuid,
        seq -> Int8,
        name -> Text,
        email -> Text,
        phone -> Text,
        lead_date -> Text,
        language -> Text,
        location -> Text,
        lead_type -> Varchar,
        status -> Varchar,
        assigned_to -> Nullable<Uuid>,
        scheduled_date -> Nullable<Text>,
        scheduled_time -> Nullable<Text>,
        uploaded_by -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    activities (id) {
        id -> Uuid,
        employee_id -> Nullable<Uuid>,
        lead_id -> Nullable<Uuid>,
        activity_type -> Varchar,
        details -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    attendance (id) {
        id -> Uuid,
        employee_id -> Uuid,
        work_date -> Varchar,
        check_in -> Nullable<Varchar>,
        check_out -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    breaks (id) {
        id -> Uuid,
        employee_id -> Uuid,
        work_date -> Varchar,
        start_time -> Varchar,
        end_time -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    admins (id) {
        id -> Uuid,
        first_name -> Text,
        last_name -> Text,
        email -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(leads -> employees (assigned_to));
diesel::joinable!(activities -> employees (employee_id));
diesel::joinable!(activities -> leads (lead_id));
diesel::joinable!(attendance -> employees (employee_id));
diesel::joinable!(breaks -> employees (employee_id));

diesel::allow_tables_to_appear_in_same_query!(
    employees,
    leads,
    activities,
    attendance,
    breaks,
    admins,
);
