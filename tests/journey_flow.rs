use journeyflow_rust::retirement::{DECLARATIONS_LIST, RETIREMENT_JOURNEY, SUBMITTED_STATUS};
use journeyflow_rust::{journey_service, Checkbox, ErrorClass, InMemoryJourneyStore, JourneyError, JourneyStage,
                       MemberRef, StepSubmission};

fn member() -> MemberRef {
    MemberRef::new("RBS", "7000001")
}

#[tokio::test]
async fn retirement_journey_reaches_terminal_and_is_submitted() {
    let service = journey_service(InMemoryJourneyStore::new());
    let m = member();
    service.start_journey(&m, RETIREMENT_JOURNEY, "personal-details", "income", Some("hub"))
           .await
           .expect("start");
    service.save_generic_data(&m, RETIREMENT_JOURNEY, "income", "salary", "{\"annual\":1}")
           .await
           .expect("income");
    service.submit_step(&m, RETIREMENT_JOURNEY, "income", "declarations-page").await.expect("submit");
    service.save_checkboxes(&m,
                            RETIREMENT_JOURNEY,
                            "declarations-page",
                            DECLARATIONS_LIST,
                            vec![Checkbox::new("truthful", true)])
           .await
           .expect("declarations");
    service.submit_step(&m, RETIREMENT_JOURNEY, "declarations-page", "hub").await.expect("finish");

    let journey = service.get_journey(&m, RETIREMENT_JOURNEY).await.unwrap().unwrap();
    assert_eq!(journey.stage(), JourneyStage::Terminal);
    assert_eq!(journey.status(), SUBMITTED_STATUS);
    assert_eq!(journey.active_page_keys(), vec!["personal-details", "income", "declarations-page"]);

    let hub = service.get_generic_data(&m, RETIREMENT_JOURNEY, "hub", "anything").await.expect("hub read");
    assert_eq!(hub.generic_data_json, "");
}

#[tokio::test]
async fn invalid_json_is_rejected_for_retirement_only() {
    let service = journey_service(InMemoryJourneyStore::new());
    let m = member();
    service.start_journey(&m, RETIREMENT_JOURNEY, "a", "b", None).await.expect("start");
    let err = service.save_generic_data(&m, RETIREMENT_JOURNEY, "a", "f", "{not json")
                     .await
                     .unwrap_err();
    assert!(matches!(err, JourneyError::RuleViolation(_)));
    assert_eq!(err.class(), ErrorClass::BadRequest);

    service.start_journey(&m, "transfer", "a", "b", None).await.expect("start transfer");
    service.save_generic_data(&m, "transfer", "a", "f", "{not json").await.expect("opaque for transfer");
}

#[tokio::test]
async fn changing_an_earlier_answer_parks_and_revives_steps() {
    let service = journey_service(InMemoryJourneyStore::new());
    let m = member();
    let t = RETIREMENT_JOURNEY;
    service.start_journey(&m, t, "has-partner", "partner-details", None).await.expect("start");
    service.save_generic_data(&m, t, "partner-details", "partner", "{\"name\":\"Sam\"}")
           .await
           .expect("partner");
    service.submit_step(&m, t, "partner-details", "income").await.expect("submit");

    // el miembro cambia de opinión: sin pareja
    let outcome = service.submit_step(&m, t, "has-partner", "income").await.expect("branch");
    assert!(matches!(outcome, StepSubmission::Branched { .. }));
    let journey = service.get_journey(&m, t).await.unwrap().unwrap();
    assert_eq!(journey.active_page_keys(), vec!["has-partner"]);
    assert_eq!(journey.next_page_key(), Some("income"));

    // vuelve a cambiar: la página aparcada regresa con sus datos
    service.submit_step(&m, t, "has-partner", "partner-details").await.expect("back");
    service.submit_step(&m, t, "partner-details", "income").await.expect("re-enter");
    let journey = service.get_journey(&m, t).await.unwrap().unwrap();
    assert_eq!(journey.active_page_keys(), vec!["has-partner", "partner-details"]);
    assert_eq!(journey.step("partner-details").and_then(|s| s.generic_data("partner")),
               Some("{\"name\":\"Sam\"}"));
    assert!(journey.branches().iter().filter(|b| !b.is_active()).all(|b| !b.is_empty()));
}
