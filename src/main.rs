use journeyflow_rust::retirement::{DECLARATIONS_LIST, RETIREMENT_JOURNEY};
use journeyflow_rust::{journey_service, Checkbox, JourneyError, JourneyResponse, JourneyService, JourneyStore,
                       MemberRef};
use log::info;

/// Recorre un journey de jubilación completo: datos personales, ingresos,
/// declaraciones y llegada a la página terminal.
async fn run_retirement_demo<S: JourneyStore>(service: &JourneyService<S>, member: &MemberRef) -> Result<(), JourneyError> {
    let journey_type = RETIREMENT_JOURNEY;
    service.start_journey(member, journey_type, "personal-details", "income", Some("hub"))
           .await?;
    service.save_generic_data(member,
                              journey_type,
                              "personal-details",
                              "contact",
                              r#"{"email":"member@example.com"}"#)
           .await?;

    // income es la página siguiente: leerla devuelve vacío y guardarla avanza
    let empty = service.get_generic_data(member, journey_type, "income", "salary").await?;
    println!("[demo] income antes de guardar: {:?}", empty.generic_data_json);
    service.save_generic_data(member, journey_type, "income", "salary", r#"{"annual":42000}"#)
           .await?;
    service.submit_step(member, journey_type, "income", "declarations-page").await?;

    service.save_checkboxes(member,
                            journey_type,
                            "declarations-page",
                            DECLARATIONS_LIST,
                            vec![Checkbox::new("truthful", true), Checkbox::new("informed", true)])
           .await?;
    service.submit_step(member, journey_type, "declarations-page", "hub").await?;

    let journey = service.get_journey(member, journey_type)
                         .await?
                         .ok_or(JourneyError::JourneyNotStarted { journey_type: journey_type.to_string() })?;
    let summary = JourneyResponse::from(&journey);
    println!("[demo] journey final: {}",
             serde_json::to_string_pretty(&summary).unwrap_or_default());
    let back = service.previous_page_key(member, journey_type, "hub").await?;
    println!("[demo] volver desde hub -> {back:?}");
    info!("demo finished key={} stage={:?}", journey.key(), journey.stage());
    Ok(())
}

#[cfg(not(feature = "pg_demo"))]
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let service = journey_service(journeyflow_rust::InMemoryJourneyStore::new());
    run_retirement_demo(&service, &MemberRef::new("RBS", "1234567")).await?;
    Ok(())
}

#[cfg(feature = "pg_demo")]
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = journeyflow_rust::config::CONFIG.build_pool()?;
    let service = journey_service(journeyflow_rust::PgJourneyStore::from_pool(pool));
    // miembro nuevo por ejecución: el journey no puede iniciarse dos veces
    let reference = chrono::Utc::now().format("%Y%m%d%H%M%S").to_string();
    run_retirement_demo(&service, &MemberRef::new("DEMO", reference)).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // Cargar variables de entorno desde .env si existe (antes de leer DATABASE_URL)
    let _ = dotenvy::dotenv();
    env_logger::init();
    if let Err(e) = run().await {
        eprintln!("[demo] error: {e}");
        std::process::exit(1);
    }
}
