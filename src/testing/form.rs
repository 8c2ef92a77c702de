//! Survey form fill sequence
//!
//! Fills the form top to bottom, one control at a time. Any stage can end
//! the scenario early with a verdict: a missing control or failed action
//! is a failure, a validation message may be the expected outcome.

use std::path::PathBuf;

use crate::common::config::{pause, Config};
use crate::device::{Device, Locator, Swipe, KEYCODE_BACK};

use super::classify::{self, SubmissionObservation, Verdict};
use super::config::Scenario;
use super::locate::{fill, find_by_attribute, find_element_safe, find_first, is_present, Wait};
use super::screens;
use super::signals::{error_displayed, name_surname_error};

/// Stage outcome; `Err` carries the verdict that ends the scenario
type Step<T> = std::result::Result<T, Verdict>;

/// Fill and submit the survey, then classify what happened
pub async fn run_scenario<D: Device + ?Sized>(
    device: &mut D,
    scenario: &Scenario,
    config: &Config,
) -> Verdict {
    match fill_and_submit(device, scenario, config).await {
        Ok(observation) => classify::classify_submission(&observation, scenario),
        Err(verdict) => verdict,
    }
}

async fn fill_and_submit<D: Device + ?Sized>(
    device: &mut D,
    scenario: &Scenario,
    config: &Config,
) -> Step<SubmissionObservation> {
    enter_name(device, scenario, config).await?;
    enter_birth_date(device, scenario, config).await?;
    select_education(device, scenario, config).await?;
    enter_city(device, scenario, config).await?;
    select_gender(device, scenario, config).await?;

    tracing::info!("Scrolling down");
    device
        .swipe(Swipe::FORM_SCROLL)
        .await
        .map_err(|e| Verdict::fail(format!("Failed to scroll: {}", e)))?;
    pause(config.delays.field_settle_ms).await;

    select_models(device, scenario, config).await?;
    enter_use_case(device, scenario, config).await?;
    submit_and_observe(device, scenario, config).await
}

fn gate(verdict: Option<Verdict>) -> Step<()> {
    verdict.map_or(Ok(()), Err)
}

async fn enter_name<D: Device + ?Sized>(
    device: &mut D,
    scenario: &Scenario,
    config: &Config,
) -> Step<()> {
    let inputs = &scenario.inputs;
    let wait = Wait::element(&config.timeouts);
    tracing::info!("Entering name: {}", inputs.name);

    let field = find_element_safe(device, &Locator::xpath(screens::NAME_INPUT), wait)
        .await
        .ok_or_else(|| Verdict::fail("Name field not found"))?;
    fill(device, &field, &inputs.name, config.delays.field_settle_ms)
        .await
        .map_err(|e| Verdict::fail(format!("Failed to enter name: {}", e)))?;

    let error = error_displayed(device, wait).await;
    gate(classify::after_name(
        error.as_deref(),
        inputs,
        &scenario.expected_result,
    ))
}

async fn enter_birth_date<D: Device + ?Sized>(
    device: &mut D,
    scenario: &Scenario,
    config: &Config,
) -> Step<()> {
    let date = &scenario.inputs.birth_date;
    let wait = Wait::element(&config.timeouts);
    tracing::info!("Entering birth date");

    let parts = [
        ("Day", screens::DAY_INPUT, &date.day),
        ("Month", screens::MONTH_INPUT, &date.month),
        ("Year", screens::YEAR_INPUT, &date.year),
    ];
    for (label, xpath, value) in parts {
        let field = find_element_safe(device, &Locator::xpath(xpath), wait)
            .await
            .ok_or_else(|| Verdict::fail(format!("{} field not found", label)))?;
        fill(device, &field, value, config.delays.field_settle_ms)
            .await
            .map_err(|e| Verdict::fail(format!("Failed to enter birth date: {}", e)))?;
    }
    tracing::info!(
        "Entered birth date: Day={}, Month={}, Year={}",
        date.day,
        date.month,
        date.year
    );

    let error = error_displayed(device, wait).await;
    gate(classify::after_birth_date(
        error.as_deref(),
        &scenario.expected_result,
    ))
}

async fn select_education<D: Device + ?Sized>(
    device: &mut D,
    scenario: &Scenario,
    config: &Config,
) -> Step<()> {
    let education = &scenario.inputs.education;
    if education.is_empty() {
        return Ok(());
    }
    let wait = Wait::element(&config.timeouts);
    let failed = |e: crate::Error| Verdict::fail(format!("Failed to select education: {}", e));
    tracing::info!("Selecting education level: {}", education);

    let dropdown = find_element_safe(device, &Locator::xpath(screens::EDUCATION_DROPDOWN), wait)
        .await
        .ok_or_else(|| Verdict::fail("Education dropdown not found"))?;
    device.click(&dropdown).await.map_err(failed)?;
    pause(config.delays.dropdown_ms).await;

    let Some(choice) = find_element_safe(device, &screens::education_option(education), wait).await
    else {
        // Leave the dropdown closed so the screenshot shows the form
        if let Err(e) = device.press_keycode(KEYCODE_BACK).await {
            tracing::debug!("Could not close education dropdown: {}", e);
        }
        return Err(Verdict::fail(format!(
            "Education choice {} not found",
            education
        )));
    };
    device.click(&choice).await.map_err(failed)?;
    Ok(())
}

async fn enter_city<D: Device + ?Sized>(
    device: &mut D,
    scenario: &Scenario,
    config: &Config,
) -> Step<()> {
    let inputs = &scenario.inputs;
    let expected = &scenario.expected_result;
    let wait = Wait::element(&config.timeouts);
    tracing::info!("Entering city: {}", inputs.city);

    // The positional path breaks whenever a validation message is inserted
    // above the city field, hence the fallbacks.
    let chain = [
        Locator::xpath(screens::CITY_INPUT),
        Locator::xpath(screens::CITY_INPUT_BY_TEXT),
    ];
    let field = match find_first(device, &chain, wait).await {
        Some(field) => Some(field),
        None => find_by_attribute(device, &Locator::xpath(screens::EDIT_TEXT), "hint", "City")
            .await
            .map_err(|e| {
                classify::city_unreachable(inputs, expected, format!("Failed to enter city: {}", e))
            })?,
    };

    let field = field.ok_or_else(|| {
        tracing::info!("City field not found");
        classify::city_unreachable(inputs, expected, "City field not found")
    })?;

    fill(device, &field, &inputs.city, config.delays.field_settle_ms)
        .await
        .map_err(|e| {
            classify::city_unreachable(inputs, expected, format!("Failed to enter city: {}", e))
        })?;

    let error = error_displayed(device, wait).await;
    gate(classify::after_city(error.as_deref(), inputs, expected))
}

async fn select_gender<D: Device + ?Sized>(
    device: &mut D,
    scenario: &Scenario,
    config: &Config,
) -> Step<()> {
    let gender = &scenario.inputs.gender;
    if gender.is_empty() {
        return Ok(());
    }
    tracing::info!("Selecting gender: {}", gender);

    let option = find_element_safe(
        device,
        &screens::gender_option(gender),
        Wait::element(&config.timeouts),
    )
    .await
    .ok_or_else(|| Verdict::fail(format!("Gender option {} not found", gender)))?;
    device
        .click(&option)
        .await
        .map_err(|e| Verdict::fail(format!("Failed to select gender: {}", e)))
}

async fn select_models<D: Device + ?Sized>(
    device: &mut D,
    scenario: &Scenario,
    config: &Config,
) -> Step<()> {
    let wait = Wait::element(&config.timeouts);
    let settle = config.delays.field_settle_ms;
    let failed = |e: crate::Error| Verdict::fail(format!("Failed with AI models: {}", e));

    for (index, (model, defect)) in scenario.inputs.ai_models_with_defects.iter().enumerate() {
        tracing::info!("Selecting AI model: {}", model);
        let checkbox = find_element_safe(device, &screens::model_checkbox(model), wait)
            .await
            .ok_or_else(|| Verdict::fail(format!("AI model {} checkbox not found", model)))?;
        device.click(&checkbox).await.map_err(failed)?;
        pause(settle).await;

        // Each ticked model inserts its defect input below the list
        device.swipe(Swipe::FORM_SCROLL).await.map_err(failed)?;
        pause(settle).await;

        tracing::info!("Entering defect for {}: {}", model, defect);
        let input = find_element_safe(device, &screens::defect_input(index + 1), wait)
            .await
            .ok_or_else(|| Verdict::fail(format!("Defect input for {} not found", model)))?;
        fill(device, &input, defect, settle).await.map_err(failed)?;
    }
    Ok(())
}

async fn enter_use_case<D: Device + ?Sized>(
    device: &mut D,
    scenario: &Scenario,
    config: &Config,
) -> Step<()> {
    let text = &scenario.inputs.beneficial_use_case;
    let failed = |e: crate::Error| {
        Verdict::fail(format!("Failed to enter beneficial use case: {}", e))
    };
    tracing::info!("Entering beneficial use case: {}", text);

    device.swipe(Swipe::FORM_SCROLL).await.map_err(failed)?;
    pause(config.delays.field_settle_ms).await;

    let field = find_element_safe(
        device,
        &Locator::xpath(screens::USE_CASE_INPUT),
        Wait::element(&config.timeouts),
    )
    .await
    .ok_or_else(|| Verdict::fail("Beneficial use case field not found"))?;
    fill(device, &field, text, config.delays.field_settle_ms)
        .await
        .map_err(failed)
}

async fn submit_and_observe<D: Device + ?Sized>(
    device: &mut D,
    scenario: &Scenario,
    config: &Config,
) -> Step<SubmissionObservation> {
    let wait = Wait::element(&config.timeouts);
    tracing::info!("Attempting to submit form");

    device.swipe(Swipe::SUBMIT_SCROLL).await.map_err(|e| {
        Verdict::fail(format!(
            "Test failed during submission verification: {}",
            e
        ))
    })?;
    pause(config.delays.field_settle_ms).await;

    // A missing or unclickable Send button is itself a signal; keep going
    match find_element_safe(device, &Locator::xpath(screens::SEND_BUTTON), wait).await {
        Some(send) => match device.click(&send).await {
            Ok(()) => {
                tracing::info!("Submit button clicked");
                pause(config.delays.after_submit_ms).await;
            }
            Err(e) => tracing::warn!("Could not click submit button: {}", e),
        },
        None => tracing::warn!("Submit button not found"),
    }

    let mut observation = SubmissionObservation {
        error: error_displayed(device, wait).await,
        ..SubmissionObservation::default()
    };

    if is_single_word(&scenario.inputs.name) {
        if let Some(text) = name_surname_error(device).await {
            observation.name_error = true;
            observation.error = Some(text);
        }
    }

    if config.output.screenshots {
        save_screenshot(device, scenario, config).await;
    }

    observation.still_on_form = is_present(device, &Locator::xpath(screens::NAME_INPUT), wait).await;
    observation.on_login_page =
        is_present(device, &Locator::xpath(screens::EMAIL_INPUT), wait).await;

    tracing::debug!(?observation, "Submission observed");
    Ok(observation)
}

fn is_single_word(name: &str) -> bool {
    name.split_whitespace().count() == 1
}

/// Screenshot file name for a scenario ("TC1.3" -> "TC1_3.png")
pub fn screenshot_file_name(scenario_id: &str) -> String {
    format!("{}.png", scenario_id.replace('.', "_"))
}

async fn save_screenshot<D: Device + ?Sized>(device: &mut D, scenario: &Scenario, config: &Config) {
    let path: PathBuf = config
        .output
        .screenshot_dir
        .join(screenshot_file_name(&scenario.scenario_id));

    let result = match device.screenshot().await {
        Ok(png) => std::fs::create_dir_all(&config.output.screenshot_dir)
            .and_then(|_| std::fs::write(&path, png))
            .map_err(crate::Error::from),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => tracing::info!("Screenshot saved as {}", path.display()),
        Err(e) => tracing::warn!("Could not take screenshot: {}", e),
    }
}
