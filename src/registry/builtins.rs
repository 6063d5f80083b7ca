//! Widget types shipped with the dashboard.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use super::definition::WidgetDefinition;
use super::options::{WidgetOptionDefinition as Opt, WidgetOptionGroup as Group};
use super::schema::FieldKind;

static HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("url pattern compiles"));

static TIMEZONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(local|UTC|[A-Za-z]+(?:/[A-Za-z0-9_+\-]+)+)$").expect("timezone pattern compiles")
});

const FONT_SIZES: (f64, f64, f64) = (8.0, 128.0, 1.0);

pub fn builtin_definitions() -> Vec<WidgetDefinition> {
    vec![
        clock(),
        weather(),
        calendar(),
        notes(),
        timer(),
        todo(),
        home_assistant(),
    ]
}

fn appearance(background: &str, text: &str, font_size: f64) -> Group {
    Group::new("appearance", "Appearance")
        .collapsed(false)
        .option(Opt::color("backgroundColor", "Background", background))
        .option(Opt::color("textColor", "Text color", text))
        .option(Opt::slider("fontSize", "Font size", FONT_SIZES, font_size))
}

pub fn clock() -> WidgetDefinition {
    WidgetDefinition::builder("clock", "Clock")
        .min_size(150.0, 100.0)
        .group(
            Group::new("display", "Display")
                .option(Opt::radio(
                    "style",
                    "Style",
                    &[("digital", "Digital"), ("analog", "Analog")],
                    "digital",
                ))
                .option(Opt::toggle("format24h", "24-hour time", false).depends_on("style", "digital"))
                .option(Opt::toggle("showSeconds", "Show seconds", true))
                .option(Opt::toggle("showDate", "Show date", true))
                .option(
                    Opt::select(
                        "dateFormat",
                        "Date format",
                        &[("short", "Short"), ("long", "Long"), ("iso", "ISO 8601")],
                        "long",
                    )
                    .depends_on("showDate", true),
                )
                .option(
                    Opt::text("timezone", "Time zone", "local")
                        .placeholder("Europe/Berlin")
                        .describe("IANA zone name, or `local`"),
                ),
        )
        .group(appearance("#00000000", "#ffffff", 48.0))
        .constrain(
            "timezone",
            FieldKind::Text {
                pattern: Some(TIMEZONE.clone()),
                max_length: Some(64),
            },
        )
        .build()
}

pub fn weather() -> WidgetDefinition {
    WidgetDefinition::builder("weather", "Weather")
        .min_size(200.0, 150.0)
        .group(
            Group::new("location", "Location")
                .option(Opt::text("location", "City", "").placeholder("Amsterdam").max_length(100))
                .option(Opt::radio(
                    "units",
                    "Units",
                    &[("metric", "Metric (°C)"), ("imperial", "Imperial (°F)")],
                    "metric",
                ))
                .option(Opt::slider(
                    "refreshInterval",
                    "Refresh every (minutes)",
                    (5.0, 120.0, 5.0),
                    30.0,
                )),
        )
        .group(
            Group::new("details", "Details")
                .collapsed(true)
                .option(Opt::toggle("showHumidity", "Humidity", true))
                .option(Opt::toggle("showWind", "Wind", true))
                .option(Opt::toggle("showForecast", "Forecast", true))
                .option(
                    Opt::slider("forecastDays", "Forecast days", (1.0, 7.0, 1.0), 5.0)
                        .depends_on("showForecast", true),
                ),
        )
        .group(appearance("#1e293b", "#f8fafc", 16.0))
        .build()
}

pub fn calendar() -> WidgetDefinition {
    WidgetDefinition::builder("calendar", "Calendar")
        .min_size(300.0, 300.0)
        .group(
            Group::new("layout", "Layout")
                .option(Opt::select(
                    "startOfWeek",
                    "Week starts on",
                    &[("monday", "Monday"), ("sunday", "Sunday")],
                    "monday",
                ))
                .option(Opt::checkbox("showWeekNumbers", "Week numbers", false))
                .option(Opt::toggle("highlightToday", "Highlight today", true))
                .option(
                    Opt::color("todayColor", "Today color", "#3b82f6")
                        .depends_on("highlightToday", true),
                ),
        )
        .group(
            Group::new("events", "Events")
                .collapsed(true)
                .option(Opt::toggle("showEvents", "Show events", true))
                .option(
                    Opt::tags("eventSources", "Calendar feeds", &[])
                        .describe("iCal URLs")
                        .depends_on("showEvents", true),
                ),
        )
        .group(appearance("#ffffff", "#111827", 14.0))
        .build()
}

pub fn notes() -> WidgetDefinition {
    WidgetDefinition::builder("notes", "Notes")
        .min_size(200.0, 150.0)
        .group(
            Group::new("content", "Content")
                .option(Opt::toggle("showTitle", "Show title", true))
                .option(
                    Opt::text("title", "Title", "Notes")
                        .max_length(60)
                        .depends_on("showTitle", true),
                )
                .option(Opt::toggle("markdown", "Render Markdown", true)),
        )
        .group(appearance("#fef3c7", "#1f2937", 14.0))
        .hidden(
            "content",
            FieldKind::Text {
                pattern: None,
                max_length: Some(20_000),
            },
            "",
        )
        .build()
}

pub fn timer() -> WidgetDefinition {
    WidgetDefinition::builder("timer", "Timer")
        .min_size(200.0, 120.0)
        .group(
            Group::new("mode", "Mode")
                .option(Opt::radio(
                    "mode",
                    "Mode",
                    &[
                        ("countdown", "Countdown"),
                        ("stopwatch", "Stopwatch"),
                        ("pomodoro", "Pomodoro"),
                    ],
                    "countdown",
                ))
                .option(
                    Opt::slider("duration", "Duration (seconds)", (10.0, 7200.0, 10.0), 300.0)
                        .depends_on("mode", "countdown"),
                )
                .option(
                    Opt::slider("workMinutes", "Work (minutes)", (5.0, 90.0, 5.0), 25.0)
                        .depends_on("mode", "pomodoro"),
                )
                .option(
                    Opt::slider("breakMinutes", "Break (minutes)", (1.0, 30.0, 1.0), 5.0)
                        .depends_on("mode", "pomodoro"),
                )
                .option(Opt::checkbox("autoRestart", "Restart automatically", false)),
        )
        .group(
            Group::new("alerts", "Alerts")
                .collapsed(false)
                .option(Opt::toggle("playSound", "Play sound", true))
                .option(
                    Opt::select(
                        "sound",
                        "Sound",
                        &[("bell", "Bell"), ("chime", "Chime"), ("beep", "Beep")],
                        "bell",
                    )
                    .depends_on("playSound", true),
                ),
        )
        .group(appearance("#0f172a", "#e2e8f0", 32.0))
        .build()
}

pub fn todo() -> WidgetDefinition {
    WidgetDefinition::builder("todo", "Todo list")
        .min_size(250.0, 200.0)
        .group(
            Group::new("list", "List")
                .option(Opt::text("title", "Title", "Todo").max_length(60))
                .option(Opt::toggle("showCompleted", "Show completed", true))
                .option(Opt::select(
                    "sortBy",
                    "Sort by",
                    &[
                        ("created", "Date added"),
                        ("alphabetical", "Alphabetical"),
                        ("priority", "Priority"),
                    ],
                    "created",
                ))
                .option(Opt::toggle("allowPriorities", "Priorities", false))
                .option(Opt::slider("maxItems", "Max items", (1.0, 200.0, 1.0), 50.0))
                .option(Opt::tags("categories", "Categories", &[])),
        )
        .group(appearance("#ffffff", "#111827", 14.0))
        .hidden("items", FieldKind::Any, json!([]))
        .build()
}

pub fn home_assistant() -> WidgetDefinition {
    WidgetDefinition::builder("homeassistant", "Home Assistant")
        .min_size(300.0, 200.0)
        .group(
            Group::new("connection", "Connection")
                .option(Opt::text("baseUrl", "Server URL", "").placeholder("http://homeassistant.local:8123"))
                .option(
                    Opt::slider("refreshInterval", "Refresh every (seconds)", (5.0, 300.0, 5.0), 10.0),
                ),
        )
        .group(
            Group::new("entities", "Entities")
                .option(Opt::custom(
                    "entityIds",
                    "Entities",
                    "entity-picker",
                    json!([]),
                ))
                .option(Opt::radio(
                    "layout",
                    "Layout",
                    &[("list", "List"), ("grid", "Grid")],
                    "list",
                ))
                .option(Opt::toggle("showIcons", "Icons", true))
                .option(
                    Opt::slider("columns", "Columns", (1.0, 6.0, 1.0), 2.0)
                        .depends_on("layout", "grid"),
                ),
        )
        .group(appearance("#111827", "#f9fafb", 14.0))
        .constrain(
            "baseUrl",
            FieldKind::Text {
                pattern: Some(HTTP_URL.clone()),
                max_length: Some(2048),
            },
        )
        .constrain("entityIds", FieldKind::StringList)
        .build()
}
