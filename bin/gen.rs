use clap::{Arg, ArgAction, Command};
use std::io::{self, Write};

const HEADER: [&str; 6] = [
    "Timestamp",
    "Full Name",
    "City / Location",
    "Which service did you hire?",
    "How would you rate your experience?",
    "Please share your feedback",
];

const CITIES: [&str; 4] = ["San Francisco, CA", "Daly City, CA", "San Mateo, CA", "Palo Alto, CA"];
const SERVICES: [&str; 3] = ["Deep clean", "Move-in / Move-out", "Office (general)"];

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn main() -> anyhow::Result<()> {
    let matches = Command::new("gen")
        .about("Write a synthetic review-form export to stdout")
        .arg(
            Arg::new("rows")
                .long("rows")
                .value_parser(clap::value_parser!(u64))
                .required(true),
        )
        .arg(Arg::new("crlf").long("crlf").action(ArgAction::SetTrue))
        .arg(Arg::new("bom").long("bom").action(ArgAction::SetTrue))
        .arg(
            Arg::new("blank_every")
                .long("blank-every")
                .help("Every Nth row has no name and no feedback")
                .value_parser(clap::value_parser!(u64))
                .default_value("0"),
        )
        .get_matches();

    let rows: u64 = *matches.get_one("rows").unwrap();
    let eol = if matches.get_flag("crlf") { "\r\n" } else { "\n" };
    let blank_every: u64 = *matches.get_one("blank_every").unwrap();

    let mut out = io::BufWriter::new(io::stdout().lock());

    if matches.get_flag("bom") {
        write!(&mut out, "\u{feff}")?;
    }
    write!(&mut out, "{}{eol}", HEADER.join(","))?;

    // Deterministic rows exercising quoting: commas, escaped quotes, embedded newlines.
    for i in 0..rows {
        let blank = blank_every > 0 && (i + 1) % blank_every == 0;
        let name = if blank { String::new() } else { format!("Customer {i}") };
        let text = if blank {
            String::new()
        } else {
            match i % 3 {
                0 => format!("Great job, thanks! #{i}"),
                1 => format!("They said \"spotless\" and meant it #{i}"),
                _ => format!("Line one{eol}line two #{i}"),
            }
        };
        let fields = [
            format!("2024-01-01 10:{:02}:00", i % 60),
            name,
            CITIES[(i % CITIES.len() as u64) as usize].to_string(),
            SERVICES[(i % SERVICES.len() as u64) as usize].to_string(),
            (i % 5 + 1).to_string(),
            text,
        ];
        let line: Vec<String> = fields.iter().map(|f| quote(f)).collect();
        write!(&mut out, "{}{eol}", line.join(","))?;
        if i % 10_000 == 0 {
            out.flush()?;
        }
    }

    out.flush()?;
    Ok(())
}
