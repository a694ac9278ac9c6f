use std::collections::HashMap;

/// One data record, keyed by the lower-cased header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: HashMap<String, String>,
}

impl Row {
    /// Value of `key`, or `""` when the column is absent.
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    /// Trimmed value of `key`, `None` when blank.
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        let value = self.get(key).trim();
        (!value.is_empty()).then_some(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unquoted,
    Quoted,
}

/// Parse spreadsheet-exported CSV into rows keyed by the header record.
///
/// Malformed quoting never fails: a stray quote just toggles the quoted
/// state and everything else is taken literally. Data records with fewer
/// than two columns are dropped.
pub fn parse(text: &str) -> Vec<Row> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = split_records(text).into_iter();

    let Some(header) = records.next() else {
        return Vec::new();
    };
    let keys: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();

    records
        .filter(|record| record.len() > 1)
        .map(|record| {
            let mut fields = HashMap::with_capacity(keys.len());
            for (i, key) in keys.iter().enumerate() {
                fields.insert(key.clone(), record.get(i).cloned().unwrap_or_default());
            }
            Row { fields }
        })
        .collect()
}

fn split_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut state = State::Unquoted;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match (state, c) {
            (State::Quoted, '"') if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            (State::Quoted, '"') => state = State::Unquoted,
            (State::Unquoted, '"') => state = State::Quoted,
            (State::Unquoted, ',') => record.push(take_trimmed(&mut field)),
            (State::Unquoted, '\r' | '\n') => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(take_trimmed(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(take_trimmed(&mut field));
        records.push(record);
    }

    records
}

fn take_trimmed(field: &mut String) -> String {
    let value = field.trim().to_string();
    field.clear();
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(value: &str) -> String {
        format!("\"{}\"", value.replace('"', "\"\""))
    }

    #[test]
    fn header_is_lowercased_and_trimmed() {
        let rows = parse(" Nome_IT , PREZZO\nPasta,8");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("nome_it"), "Pasta");
        assert_eq!(rows[0].get("prezzo"), "8");
    }

    #[test]
    fn quoted_fields_round_trip() {
        let values = [
            "Pasta, al pomodoro",
            "He said \"buono\"",
            "line one\nline two",
            "crlf\r\ninside",
            "plain",
        ];
        let header = "a,b,c,d,e";
        let line: Vec<String> = values.iter().map(|v| quote(v)).collect();
        let text = format!("{}\n{}\n", header, line.join(","));

        let rows = parse(&text);
        assert_eq!(rows.len(), 1);
        for (key, expected) in ["a", "b", "c", "d", "e"].iter().zip(values) {
            assert_eq!(rows[0].get(key), expected, "column {}", key);
        }
    }

    #[test]
    fn all_record_separators() {
        let rows = parse("a,b\n1,2\r3,4\r\n5,6");
        let firsts: Vec<&str> = rows.iter().map(|r| r.get("a")).collect();
        assert_eq!(firsts, vec!["1", "3", "5"]);
    }

    #[test]
    fn byte_order_mark_is_stripped() {
        let rows = parse("\u{feff}attivo,nome_it\nx,Tiramisù\n");
        assert_eq!(rows[0].get("attivo"), "x");
        assert_eq!(rows[0].get("nome_it"), "Tiramisù");
    }

    #[test]
    fn short_rows_are_discarded() {
        let rows = parse("a,b\n\nonly\n1,2\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("b"), "2");
    }

    #[test]
    fn missing_values_default_to_empty() {
        let rows = parse("a,b,c\n1,2\n");
        assert_eq!(rows[0].get("c"), "");
        assert_eq!(rows[0].get("not_a_column"), "");
        assert_eq!(rows[0].non_blank("c"), None);
    }

    #[test]
    fn fields_are_trimmed() {
        let rows = parse("a,b\n  spaced  ,\" quoted \"\n");
        assert_eq!(rows[0].get("a"), "spaced");
        assert_eq!(rows[0].get("b"), "quoted");
    }

    #[test]
    fn malformed_quoting_degrades_literally() {
        let rows = parse("a,b\nab\"c,d\"e\n");
        // The stray quote opens a quoted run that swallows the comma.
        assert_eq!(rows.len(), 0);

        let rows = parse("a,b\nab\"c\"d,e\n");
        assert_eq!(rows[0].get("a"), "abcd");
        assert_eq!(rows[0].get("b"), "e");
    }

    #[test]
    fn empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("a,b\n").is_empty());
    }

    #[test]
    fn fixture_parses() {
        let text = std::fs::read_to_string("tests/fixtures/cuisine.csv").unwrap();
        let rows = parse(&text);
        assert!(rows.len() >= 5);
        assert!(rows.iter().all(|r| !r.get("nome_it").is_empty()));
    }
}
