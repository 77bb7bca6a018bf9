//! Plain-text rendering of the session: current conditions plus whichever
//! forecast view is active.

use chrono::{DateTime, Local};

use skycast_core::format::{
    format_humidity, format_temperature, format_wind, unit_suffix, weekday_label,
};
use skycast_core::provider::openweather::icon_url;
use skycast_core::{DEFAULT_HOURLY_WINDOW, Session, View};

pub fn render(session: &Session) {
    println!();
    println!("== Skycast [{} theme] ==", session.theme().name());

    if let Some(message) = session.transient_message() {
        println!("* {message}");
    }

    if let Some(err) = session.last_error() {
        println!("Error: {err}");
    }

    if session.is_loading() {
        println!("Loading weather data...");
        return;
    }

    let (Some(coordinate), Some(current)) =
        (session.active_coordinate(), session.current_weather())
    else {
        println!("No weather data available.");
        return;
    };

    let units = session.units();
    println!(
        "Weather for: {} (°{})",
        coordinate.display_name,
        unit_suffix(units)
    );
    println!(
        "  Current: {}, {}",
        format_temperature(current.temperature, units),
        current.condition.text
    );
    println!("  Humidity: {}", format_humidity(current.humidity));
    println!("  Wind speed: {}", format_wind(current.wind_speed, units));
    println!("  Icon: {}", icon_url(&current.condition.code));
    println!();

    match session.view() {
        View::Daily => render_daily(session),
        View::Hourly => render_hourly(session),
    }
}

fn render_daily(session: &Session) {
    let units = session.units();

    println!("5-Day Forecast");
    for day in session.day_summaries() {
        println!(
            "  {:<10}  {:<22}  min {}, max {}",
            weekday_label(&day.day_key),
            day.condition.text,
            format_temperature(day.min_temperature, units),
            format_temperature(day.max_temperature, units),
        );
    }
}

fn render_hourly(session: &Session) {
    let units = session.units();

    println!("24-Hour Forecast");
    for sample in session.hourly_window(DEFAULT_HOURLY_WINDOW) {
        println!(
            "  {}  {:>8}  {}",
            local_time_label(sample.timestamp),
            format_temperature(sample.temperature, units),
            sample.condition.text,
        );
    }
}

fn local_time_label(epoch_seconds: i64) -> String {
    DateTime::from_timestamp(epoch_seconds, 0)
        .map(|utc| utc.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_else(|| epoch_seconds.to_string())
}
