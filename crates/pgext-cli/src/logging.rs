use std::{fmt, io::Write};

use nu_ansi_term::Color::{Blue, DarkGray, Magenta, Red, Yellow};
use tracing::{
    field::{Field, Visit},
    Event, Level, Metadata, Subscriber,
};
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields, MakeWriter},
    registry::LookupSpan,
};

use crate::{cli::Args, utils::Colored};

/// Message and structured fields of one event, in recording order.
#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl EventVisitor {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name(), value));
        }
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }
}

/// Plain-text formatter: a coloured level tag (none for INFO), the message,
/// then any structured fields as dimmed `key=value` pairs.
pub struct CustomFormatter;

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let tag = match *event.metadata().level() {
            Level::TRACE => Some(Colored(Magenta, "[TRACE]")),
            Level::DEBUG => Some(Colored(Blue, "[DEBUG]")),
            Level::INFO => None,
            Level::WARN => Some(Colored(Yellow, "[WARN]")),
            Level::ERROR => Some(Colored(Red, "[ERROR]")),
        };
        if let Some(tag) = tag {
            write!(writer, "{tag} ")?;
        }

        write!(writer, "{}", visitor.message)?;
        for (key, value) in &visitor.fields {
            write!(writer, " {}", Colored(DarkGray, format!("{key}={value}")))?;
        }
        writeln!(writer)
    }
}

/// Routes INFO events (the command output) to stdout and diagnostics to
/// stderr, so `pgext ... --json > out.json` stays clean.
struct StdioSplit;

impl<'a> MakeWriter<'a> for StdioSplit {
    type Writer = Box<dyn Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        Box::new(std::io::stdout())
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        if *meta.level() == Level::INFO {
            Box::new(std::io::stdout())
        } else {
            Box::new(std::io::stderr())
        }
    }
}

fn max_level(args: &Args) -> Level {
    match (args.quiet, args.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

pub fn setup_logging(args: &Args) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(format!("pgext={}", max_level(args)))
        .with_target(false)
        .with_writer(StdioSplit)
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if args.json {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.event_format(CustomFormatter).finish())
    };

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}
