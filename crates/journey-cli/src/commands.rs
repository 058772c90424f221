// commands.rs
use journey_core::{JourneyError, JourneyResponse, JourneyService, JourneyStore};
use journey_domain::{Checkbox, MemberRef};
use log::debug;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{Command, Target};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Journey(#[from] JourneyError),
    #[error("output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Interpreta `clave=true|false` (también `clave` sola como `true`).
pub fn parse_checkbox(raw: &str) -> Result<Checkbox, String> {
    let (key, value) = raw.split_once('=').unwrap_or((raw, "true"));
    if key.is_empty() {
        return Err(format!("checkbox sin clave: {raw:?}"));
    }
    let answer = value.parse::<bool>()
                      .map_err(|_| format!("valor inválido para {key}: {value:?} (true|false)"))?;
    Ok(Checkbox::new(key, answer))
}

fn member_of(target: &Target) -> Result<MemberRef, CliError> {
    if target.business_group.is_empty() || target.reference_number.is_empty() || target.journey_type.is_empty() {
        return Err(CliError::Usage("se requieren --business-group, --reference-number y --type".into()));
    }
    Ok(MemberRef::new(target.business_group.clone(), target.reference_number.clone()))
}

/// Ejecuta un comando y devuelve la respuesta JSON a imprimir.
pub async fn execute<S: JourneyStore>(service: &JourneyService<S>,
                                      target: &Target,
                                      command: Command)
                                      -> Result<Value, CliError> {
    let member = member_of(target)?;
    let journey_type = target.journey_type.as_str();
    debug!("execute:start journey_type={journey_type} member={member} command={command:?}");
    let output = match command {
        Command::Start { current_page_key,
                         next_page_key,
                         terminal, } => {
            let journey = service.start_journey(&member,
                                                journey_type,
                                                &current_page_key,
                                                &next_page_key,
                                                terminal.as_deref())
                                 .await?;
            serde_json::to_value(JourneyResponse::from(&journey))?
        }
        Command::Submit { current_page_key,
                          next_page_key, } => {
            let outcome = service.submit_step(&member, journey_type, &current_page_key, &next_page_key)
                                 .await?;
            json!({ "outcome": format!("{outcome:?}") })
        }
        Command::Show => match service.get_journey(&member, journey_type).await? {
            Some(journey) => serde_json::to_value(JourneyResponse::from(&journey))?,
            None => return Err(JourneyError::JourneyNotStarted { journey_type: journey_type.to_string() }.into()),
        },
        Command::GetData { page_key, form_key } => {
            serde_json::to_value(service.get_generic_data(&member, journey_type, &page_key, &form_key).await?)?
        }
        Command::SaveData { page_key,
                            form_key,
                            json, } => {
            service.save_generic_data(&member, journey_type, &page_key, &form_key, &json)
                   .await?;
            json!({ "saved": true })
        }
        Command::GetCheckboxes { page_key, list_key } => {
            serde_json::to_value(service.get_checkboxes(&member, journey_type, &page_key, &list_key).await?)?
        }
        Command::SaveCheckboxes { page_key,
                                  list_key,
                                  checkboxes, } => {
            service.save_checkboxes(&member, journey_type, &page_key, &list_key, checkboxes)
                   .await?;
            json!({ "saved": true })
        }
        Command::Previous { page_key } => {
            let previous = service.previous_page_key(&member, journey_type, &page_key).await?;
            json!({ "previousPageKey": previous })
        }
    };
    Ok(output)
}
