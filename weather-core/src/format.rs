use crate::{
    locale::{MessageKey, Templates},
    model::{CurrentWeather, Forecast, WeatherCondition},
};

/// Descriptions in provider order, joined with ", ".
pub fn join_conditions(conditions: &[WeatherCondition]) -> String {
    conditions
        .iter()
        .map(|c| c.description.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_current_weather(weather: &CurrentWeather, templates: &Templates<'_>) -> String {
    templates.render(
        MessageKey::CurrentWeatherFormat,
        &[
            &weather.city_name,
            &rounded(weather.temperature),
            &join_conditions(&weather.conditions),
            &weather.humidity,
            &weather.pressure_mmhg(),
        ],
    )
}

pub fn format_forecast(forecast: &Forecast, templates: &Templates<'_>) -> String {
    let items = forecast
        .samples
        .iter()
        .map(|sample| {
            templates.render(
                MessageKey::ForecastItemFormat,
                &[
                    &sample.sample_time_text,
                    &rounded(sample.min_temperature),
                    &rounded(sample.max_temperature),
                    &join_conditions(&sample.conditions),
                ],
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    templates.render(
        MessageKey::ForecastFormat,
        &[&forecast.city.name, &forecast.city.country, &items],
    )
}

fn rounded(value: f64) -> i64 {
    value.round() as i64
}
