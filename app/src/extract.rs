use crate::error::ExtractError;
use crate::models::CompanyRecord;
use crate::retriever::CompanyDocuments;
use crate::ui;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;
use std::sync::LazyLock;

static INFO: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.info").expect("Failed to parse info selector - this is a bug")
});
static NAME_HEADING: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.name h1").expect("Failed to parse name selector - this is a bug")
});
static CELL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("td").expect("Failed to parse cell selector - this is a bug")
});

/// Row labels as they appear in the directory's tables.
///
/// These are matched against live markup; when the site renames a row, this
/// is the only place to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Code,
    Address,
    Website,
    Employees,
    SodraCode,
    AverageSalary,
    Revenue,
    Transport,
    RegistrationAddress,
    Registered,
    LegalForm,
    LegalStatus,
    Industry,
}

impl Label {
    pub fn text(self) -> &'static str {
        match self {
            Label::Code => "Įmonės kodas",
            Label::Address => "Adresas",
            Label::Website => "Tinklalapis",
            Label::Employees => "Darbuotojai",
            Label::SodraCode => "SD draudėjo kodas",
            Label::AverageSalary => "Vidutinis atlyginimas",
            Label::Revenue => "Pardavimo pajamos",
            Label::Transport => "Transportas",
            Label::RegistrationAddress => "Registracijos adresas",
            Label::Registered => "Įregistruotas",
            Label::LegalForm => "Teisinė forma",
            Label::LegalStatus => "Teisinis statusas",
            Label::Industry => "EVRK 2 red. veikla",
        }
    }
}

/// Value cell of the row labelled `label`: the `td` following the first `td`
/// whose text is exactly the label.
pub fn lookup<'a>(container: ElementRef<'a>, label: Label) -> Option<ElementRef<'a>> {
    let label = label.text();
    container
        .select(&CELL)
        .find(|cell| cell.text().collect::<String>() == label)?
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "td")
}

/// Drops carriage returns, tabs and newlines.
pub fn clean(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\r' | '\t' | '\n'))
        .collect()
}

fn raw_text(cell: ElementRef<'_>) -> String {
    cell.text().collect()
}

fn cleaned_text(cell: ElementRef<'_>) -> String {
    clean(&raw_text(cell)).trim().to_string()
}

/// Text of `cell` with every nested `span` left out, content included.
fn text_without_spans(cell: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in cell.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(element) = ElementRef::wrap(child) {
            if element.value().name() != "span" {
                out.push_str(&text_without_spans(element));
            }
        }
    }
    out
}

fn parse_number<T: FromStr>(field: &str, token: &str) -> Option<T> {
    match token.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            ui::print_verbose(&format!("Ignoring non-numeric {} value {:?}", field, token));
            None
        }
    }
}

/// First space-separated token, e.g. `"12 (2024-05)"` -> 12.
pub fn split_employees(text: &str) -> Option<u32> {
    let first = text.split(' ').next()?;
    parse_number("employees", first)
}

/// `"2020: 1 000 000 €"` -> (`"2020"`, `"1 000 000"`).
pub fn split_revenue(text: &str) -> (Option<String>, Option<String>) {
    let mut parts = text.split(": ");
    let year = parts.next().map(|y| y.trim().to_string());
    let range = parts
        .next()
        .and_then(|r| r.split(" €").next())
        .map(|r| r.trim().to_string());
    (year, range)
}

/// `"nuo 2015-01-01: 3 automobiliai"` -> (`"nuo 2015-01-01"`, 3).
pub fn split_transport(text: &str) -> (Option<String>, Option<u32>) {
    let mut parts = text.split(": ");
    let since = parts.next().map(|d| d.trim().to_string());
    let cars = parts
        .next()
        .and_then(|c| c.trim().split(' ').next())
        .and_then(|c| parse_number("cars", c));
    (since, cars)
}

/// `"1 234,56 €"` -> 1234.56.
pub fn parse_salary(text: &str) -> Option<Decimal> {
    let amount: String = text
        .split('€')
        .next()?
        .chars()
        // thousands separators: plain, no-break and narrow no-break spaces
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    parse_number("averagesalary", &amount)
}

fn info_container<'a>(
    document: &'a Html,
    missing: &'static str,
) -> Result<ElementRef<'a>, ExtractError> {
    document
        .select(&INFO)
        .next()
        .ok_or(ExtractError::MissingElement(missing))
}

/// Builds the record from the detail page and the legal entity page.
///
/// `code` is the code that was searched for; it stands in when the detail
/// page has no code row.
pub fn extract_company(
    documents: &CompanyDocuments,
    code: &str,
) -> Result<CompanyRecord, ExtractError> {
    let primary = Html::parse_document(&String::from_utf8_lossy(&documents.primary));
    let legal = Html::parse_document(&String::from_utf8_lossy(&documents.legal_entity));

    let profile = info_container(&primary, "info container on company page")?;
    let registration = info_container(&legal, "info container on legal entity page")?;

    let name = primary
        .select(&NAME_HEADING)
        .next()
        .map(raw_text)
        .ok_or(ExtractError::MissingElement("company name heading"))?;

    let cleaned = |container: ElementRef<'_>, label: Label| lookup(container, label).map(cleaned_text);

    let (turnoveryear, turnoverrange) = match cleaned(profile, Label::Revenue) {
        Some(text) => split_revenue(&text),
        None => (None, None),
    };
    let (cardate, cars) = match cleaned(profile, Label::Transport) {
        Some(text) => split_transport(&text),
        None => (None, None),
    };

    // The industry row is required, unlike the other legal entity rows.
    let industry = lookup(registration, Label::Industry)
        .map(|cell| clean(&text_without_spans(cell)).trim().to_string())
        .ok_or(ExtractError::MissingElement(Label::Industry.text()))?;

    Ok(CompanyRecord {
        name,
        code: lookup(profile, Label::Code)
            .map(raw_text)
            .unwrap_or_else(|| code.to_string()),
        address: lookup(profile, Label::Address).map(raw_text),
        website: lookup(profile, Label::Website).map(raw_text),
        employees: cleaned(profile, Label::Employees).and_then(|t| split_employees(&t)),
        sodracode: cleaned(profile, Label::SodraCode)
            .map(|t| t.split_whitespace().map(str::to_string).collect()),
        averagesalary: cleaned(profile, Label::AverageSalary).and_then(|t| parse_salary(&t)),
        turnoveryear,
        turnoverrange,
        cardate,
        cars,
        regaddress: cleaned(registration, Label::RegistrationAddress),
        regdate: cleaned(registration, Label::Registered),
        legalform: cleaned(registration, Label::LegalForm),
        status: cleaned(registration, Label::LegalStatus),
        industry,
    })
}
