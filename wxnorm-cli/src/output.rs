use chrono::NaiveDate;
use serde_json::Value;
use wxnorm_core::{CitySuggestion, NormalizedCurrent, NormalizedForecastDay, WeatherReport};

pub fn print_current(current: &NormalizedCurrent, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(current)?);
        return Ok(());
    }

    println!("{}", current_line(current));
    Ok(())
}

pub fn print_report(report: &WeatherReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("{}", current_line(&report.current));
    if report.forecast.is_empty() {
        println!("No forecast available.");
    }
    let symbol = report.current.units.temperature_symbol();
    for day in &report.forecast {
        println!("  {:<12} {:>6.1}{symbol}", day_label(day), day.average_temperature);
    }
    Ok(())
}

pub fn print_suggestions(suggestions: &[CitySuggestion], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(suggestions)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("No matching cities.");
    }
    for s in suggestions {
        println!("{}  ({:.4}, {:.4})", s.label, s.latitude, s.longitude);
    }
    Ok(())
}

fn current_line(current: &NormalizedCurrent) -> String {
    let temp = format!("{:.1}{}", current.temperature, current.units.temperature_symbol());
    match place_name(&current.raw) {
        Some(place) => format!("{place}: {temp}"),
        None => format!("Now: {temp}"),
    }
}

/// WeatherAPI nests the place under `location`, OpenWeather puts it at the top.
fn place_name(raw: &Value) -> Option<&str> {
    raw.pointer("/location/name")
        .or_else(|| raw.get("name"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn day_label(day: &NormalizedForecastDay) -> String {
    NaiveDate::parse_from_str(&day.date, "%Y-%m-%d")
        .map(|d| d.format("%a %d %b").to_string())
        .unwrap_or_else(|_| day.date.clone())
}
