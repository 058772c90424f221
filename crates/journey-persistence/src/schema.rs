//! Esquema Diesel de la tabla `journeys`. Reemplazable con `diesel print-schema`.

diesel::table! {
    journeys (journey_type, business_group, reference_number) {
        journey_type -> Text,
        business_group -> Text,
        reference_number -> Text,
        status -> Text,
        start_date -> Timestamptz,
        current_page_key -> Nullable<Text>,
        next_page_key -> Nullable<Text>,
        terminal_page_key -> Nullable<Text>,
        payload -> Jsonb,
        version -> BigInt,
        updated_at -> Timestamptz,
    }
}
