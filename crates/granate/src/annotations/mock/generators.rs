//! Named fake data generators used by `@mock(value: "...")`.

use chrono::{DateTime, Datelike, Timelike, Utc};
use rand::{seq::SliceRandom, Rng};
use serde_json::Value;

use crate::mocks::MockFactory;

const WORDS: &[&str] = &[
    "alias", "consequatur", "aut", "perferendis", "sit", "voluptatem", "accusantium", "doloremque", "aperiam",
    "eaque", "ipsa", "quae", "ab", "illo", "inventore", "veritatis", "et", "quasi", "architecto", "beatae",
    "vitae", "dicta", "sunt", "explicabo", "nemo", "enim", "ipsam", "quia", "voluptas", "aspernatur", "odit",
    "fugit", "sed", "consequuntur", "magni", "dolores", "eos", "qui", "ratione", "sequi", "nesciunt", "neque",
    "dolorem", "ipsum", "dolor", "amet", "consectetur", "adipisci", "velit", "numquam", "eius", "modi",
    "tempora", "incidunt", "ut", "labore", "dolore", "magnam", "aliquam", "quaerat",
];

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carla", "Daniel", "Elena", "Farid", "Greta", "Hugo", "Ines", "Jonas", "Kira", "Liam",
    "Maya", "Noah", "Olga", "Pablo", "Quinn", "Rosa", "Samir", "Tara", "Umar", "Vera", "Wanda", "Yusuf",
];

const LAST_NAMES: &[&str] = &[
    "Anderson", "Becker", "Costa", "Dubois", "Eriksen", "Fischer", "Garcia", "Hansen", "Ivanova", "Jensen",
    "Kowalski", "Larsen", "Moreau", "Novak", "Okafor", "Petrov", "Rossi", "Schmidt", "Tanaka", "Weber",
];

const COUNTRIES: &[(&str, &str)] = &[
    ("Argentina", "AR"),
    ("Australia", "AU"),
    ("Brazil", "BR"),
    ("Canada", "CA"),
    ("Denmark", "DK"),
    ("Finland", "FI"),
    ("France", "FR"),
    ("Germany", "DE"),
    ("India", "IN"),
    ("Italy", "IT"),
    ("Japan", "JP"),
    ("Kenya", "KE"),
    ("Mexico", "MX"),
    ("Nigeria", "NG"),
    ("Norway", "NO"),
    ("Poland", "PL"),
    ("Portugal", "PT"),
    ("Spain", "ES"),
    ("Sweden", "SE"),
    ("United States", "US"),
];

const CITIES: &[&str] = &[
    "Amsterdam", "Berlin", "Bogota", "Cairo", "Dublin", "Helsinki", "Lagos", "Lima", "Lisbon", "Madrid",
    "Montreal", "Nairobi", "Osaka", "Oslo", "Paris", "Prague", "Seoul", "Sydney", "Toronto", "Vienna",
];

const STREET_SUFFIXES: &[&str] = &["Street", "Avenue", "Road", "Lane", "Boulevard", "Way", "Court", "Place"];

const COMPANY_SUFFIXES: &[&str] = &["Inc.", "LLC", "Group", "and Sons", "Ltd.", "GmbH"];

const DOMAIN_SUFFIXES: &[&str] = &["com", "net", "org", "io", "dev", "info"];

const COLOR_NAMES: &[&str] = &[
    "AliceBlue", "Aqua", "Beige", "Black", "Blue", "Coral", "Crimson", "DarkGreen", "Gold", "Gray", "Indigo",
    "Lavender", "Lime", "Magenta", "Navy", "Olive", "Orange", "Purple", "Salmon", "Teal", "Tomato", "White",
];

const MONTH_NAMES: &[&str] = &[
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DAY_NAMES: &[&str] = &["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

const CURRENCY_CODES: &[&str] = &["EUR", "USD", "GBP", "JPY", "CHF", "SEK", "NOK", "BRL", "INR", "CAD"];

const DATE_TOKENS: &[&str] = &["YYYY", "YY", "MM", "DD", "HH", "mm", "ss"];

/// A mock factory for the generator called `name`, invoked with `args`.
///
/// An unknown name is a literal: one of the args picked at random, or the name itself when no
/// args are given.
pub fn generator(name: &str, args: Vec<Value>) -> MockFactory {
    let name = name.to_owned();

    std::sync::Arc::new(move || generate(&name, &args).unwrap_or_else(|| literal(&name, &args)))
}

pub fn is_known(name: &str) -> bool {
    generate(name, &[]).is_some()
}

fn literal(name: &str, args: &[Value]) -> Value {
    args.choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| Value::from(name))
}

fn generate(name: &str, args: &[Value]) -> Option<Value> {
    let mut rng = rand::thread_rng();

    let value = match name {
        // text
        "word" => Value::from(word()),
        "words" => Value::from(words(int_arg(args, 0, 7))),
        "letter" => Value::from(char::from(rng.gen_range(b'a'..=b'z')).to_string()),
        "title" => Value::from(capitalize_each(&words(rng.gen_range(1..=4)))),
        "sentence" => Value::from(sentence()),
        "sentences" => Value::from(sentences(int_arg(args, 0, 3))),
        "short_description" => Value::from(sentence()),
        "description" => Value::from(sentences(rng.gen_range(2..=4))),
        "text" => Value::from(sentences(rng.gen_range(3..=10))),
        "string" => Value::from(words(rng.gen_range(1..=7))),

        // person
        "first_name" => Value::from(pick(FIRST_NAMES)),
        "last_name" => Value::from(pick(LAST_NAMES)),
        "name" | "full_name" => Value::from(format!("{} {}", pick(FIRST_NAMES), pick(LAST_NAMES))),
        "username" => Value::from(format!(
            "{}{}",
            pick(FIRST_NAMES).to_lowercase(),
            rng.gen_range(1..1000)
        )),
        "email" => Value::from(format!(
            "{}.{}@{}",
            pick(FIRST_NAMES).to_lowercase(),
            pick(LAST_NAMES).to_lowercase(),
            domain()
        )),
        "password" => Value::from(
            (0..12)
                .map(|_| char::from(rng.gen_range(b'!'..=b'~')))
                .collect::<String>(),
        ),
        "phone" => Value::from(format!(
            "{:03}-{:03}-{:04}",
            rng.gen_range(200..1000),
            rng.gen_range(0..1000),
            rng.gen_range(0..10000)
        )),
        "company_name" => Value::from(format!("{} {}", pick(LAST_NAMES), pick(COMPANY_SUFFIXES))),
        "company_suffix" => Value::from(pick(COMPANY_SUFFIXES)),
        "catch_phrase" => Value::from(capitalize(&words(3))),

        // address
        "country" => Value::from(pick(COUNTRIES).0),
        "country_code" => Value::from(pick(COUNTRIES).1),
        "city" => Value::from(pick(CITIES)),
        "street" => Value::from(format!("{} {}", pick(LAST_NAMES), pick(STREET_SUFFIXES))),
        "address" => Value::from(format!(
            "{} {} {}, {}",
            rng.gen_range(1..1000),
            pick(LAST_NAMES),
            pick(STREET_SUFFIXES),
            pick(CITIES)
        )),
        "zip" => Value::from(digits(int_arg(args, 0, 5))),
        "latitude" => Value::from(format!("{:.6}", rng.gen_range(-90.0..90.0))),
        "longitude" => Value::from(format!("{:.6}", rng.gen_range(-180.0..180.0))),

        // internet
        "domain" => Value::from(domain()),
        "url" => Value::from(format!("https://www.{}/", domain())),
        "ip" => Value::from(format!(
            "{}.{}.{}.{}",
            rng.gen_range(1..=255),
            rng.gen_range(0..=255),
            rng.gen_range(0..=255),
            rng.gen_range(1..=255)
        )),
        "uuid" => Value::from(uuid::Uuid::new_v4().to_string()),
        "color_name" => Value::from(pick(COLOR_NAMES)),
        "rgb_hex" => Value::from(format!("#{:06x}", rng.gen_range(0..=0xff_ffff))),
        "currency_code" => Value::from(pick(CURRENCY_CODES)),

        // numbers
        "integer" => {
            let (from, to) = ordered(int_arg(args, 0, -1000), int_arg(args, 1, 1000));
            Value::from(rng.gen_range(from..=to))
        }
        "double" => {
            let (from, to) = ordered_float(float_arg(args, 0, -1000.0), float_arg(args, 1, 1000.0));
            Value::from(random_double(&mut rng, from, to))
        }
        "digit" => Value::from(rng.gen_range(0..10_i64)),
        "coin_flip" => Value::from(rng.gen::<bool>()),
        "random_element" => args
            .first()
            .and_then(Value::as_array)
            .and_then(|values| values.choose(&mut rng))
            .cloned()
            .unwrap_or(Value::Null),

        // dates
        "unix_time" => Value::from(random_timestamp()),
        "date" => Value::from(format_moment(str_arg(args, 0).unwrap_or("YYYY-MM-DD"), &random_time()?)),
        "time" => Value::from(format_moment(str_arg(args, 0).unwrap_or("HH:mm:ss"), &random_time()?)),
        "year" => Value::from(random_time()?.year()),
        "month_number" => Value::from(random_time()?.month()),
        "month_name" => Value::from(pick(MONTH_NAMES)),
        "day_of_month" => Value::from(random_time()?.day()),
        "day_of_week" => Value::from(pick(DAY_NAMES)),
        "day_of_year" => Value::from(random_time()?.ordinal()),
        "am_pm" => Value::from(if rng.gen::<bool>() { "am" } else { "pm" }),

        _ => return None,
    };

    Some(value)
}

/// A value in `[from, to)`. Ranges too wide for `to - from` to be finite are sampled as a
/// fraction of the way from `from` to `to`.
fn random_double(rng: &mut impl Rng, from: f64, to: f64) -> f64 {
    if from >= to {
        return from;
    }

    if (to - from).is_finite() {
        return rng.gen_range(from..to);
    }

    let half_step = rng.gen::<f64>() * (to / 2.0 - from / 2.0);
    from + half_step + half_step
}

fn pick<T: Copy>(values: &[T]) -> T {
    let index = rand::thread_rng().gen_range(0..values.len());
    values[index]
}

fn word() -> &'static str {
    pick(WORDS)
}

fn words(count: i64) -> String {
    (0..count.max(0)).map(|_| word()).collect::<Vec<_>>().join(" ")
}

fn sentence() -> String {
    format!("{}.", capitalize(&words(rand::thread_rng().gen_range(3..=10))))
}

fn sentences(count: i64) -> String {
    (0..count.max(0)).map(|_| sentence()).collect::<Vec<_>>().join(" ")
}

fn digits(count: i64) -> String {
    let mut rng = rand::thread_rng();
    (0..count.max(0))
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect()
}

fn domain() -> String {
    format!("{}.{}", pick(LAST_NAMES).to_lowercase(), pick(DOMAIN_SUFFIXES))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn capitalize_each(text: &str) -> String {
    text.split(' ').map(capitalize).collect::<Vec<_>>().join(" ")
}

fn random_timestamp() -> i64 {
    rand::thread_rng().gen_range(0..2_000_000_000)
}

fn random_time() -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(random_timestamp(), 0)
}

/// Formats with moment style tokens, everything else is copied.
fn format_moment(format: &str, time: &DateTime<Utc>) -> String {
    let mut output = String::with_capacity(format.len());
    let mut rest = format;

    while !rest.is_empty() {
        if let Some(token) = DATE_TOKENS.iter().find(|token| rest.starts_with(**token)) {
            let rendered = match *token {
                "YYYY" => format!("{:04}", time.year()),
                "YY" => format!("{:02}", time.year() % 100),
                "MM" => format!("{:02}", time.month()),
                "DD" => format!("{:02}", time.day()),
                "HH" => format!("{:02}", time.hour()),
                "mm" => format!("{:02}", time.minute()),
                _ => format!("{:02}", time.second()),
            };

            output.push_str(&rendered);
            rest = &rest[token.len()..];
            continue;
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            output.push(c);
        }
        rest = chars.as_str();
    }

    output
}

fn int_arg(args: &[Value], index: usize, default: i64) -> i64 {
    args.get(index).and_then(Value::as_i64).unwrap_or(default)
}

fn float_arg(args: &[Value], index: usize, default: f64) -> f64 {
    args.get(index).and_then(Value::as_f64).unwrap_or(default)
}

fn str_arg(args: &[Value], index: usize) -> Option<&str> {
    args.get(index).and_then(Value::as_str)
}

fn ordered(a: i64, b: i64) -> (i64, i64) {
    (a.min(b), a.max(b))
}

fn ordered_float(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
