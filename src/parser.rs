//! This module reads the line-oriented configuration format into a `MachineDefinition`.
//!
//! A configuration is a sequence of sections, each opened by a header line such as
//! `States:` or `Transitions:`. Sections may appear in any order and may be repeated; their
//! contents are merged. Transition lines are matched with the `pest` grammar in `grammar.pest`.

use crate::{
    definition::{MachineDefinition, Settings},
    types::{Direction, Metadata, ParseError, Transition},
    validator::validate,
};
use chrono::{DateTime, Utc};
use pest::Parser as PestParser;
use pest_derive::Parser as PestParser;
use std::collections::BTreeSet;
use tracing::warn;

/// Derives a `PestParser` for transition lines defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct ConfigParser;

pub(crate) const CREATOR_PREFIX: &str = "Created by:";
pub(crate) const CREATED_AT_PREFIX: &str = "Created at:";

/// The sections of a configuration file, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Section {
    States,
    InputAlphabet,
    TapeAlphabet,
    Start,
    Accept,
    Reject,
    Transitions,
}

impl Section {
    pub(crate) const ALL: [Section; 7] = [
        Section::States,
        Section::InputAlphabet,
        Section::TapeAlphabet,
        Section::Start,
        Section::Accept,
        Section::Reject,
        Section::Transitions,
    ];

    pub(crate) fn name(self) -> &'static str {
        match self {
            Section::States => "States",
            Section::InputAlphabet => "Input Alphabet",
            Section::TapeAlphabet => "Tape Alphabet",
            Section::Start => "Start",
            Section::Accept => "Accept",
            Section::Reject => "Reject",
            Section::Transitions => "Transitions",
        }
    }

    fn is_required(self) -> bool {
        self != Section::Reject
    }

    /// Recognizes a header line such as `Tape Alphabet:`.
    fn from_header(line: &str) -> Option<Self> {
        let name = line.strip_suffix(':')?.trim();
        Self::ALL.into_iter().find(|section| section.name() == name)
    }
}

/// Parses a configuration using the default [`Settings`].
///
/// The resulting definition is validated before it is returned.
///
/// # Arguments
///
/// * `input` - The configuration text.
///
/// # Returns
///
/// * `Ok(MachineDefinition)` if the text is well formed and describes a valid machine.
/// * `Err(ParseError)` describing the first problem found.
pub fn parse(input: &str) -> Result<MachineDefinition, ParseError> {
    parse_with(input, Settings::default())
}

/// Parses a configuration, building the definition on top of `settings`.
pub fn parse_with(input: &str, settings: Settings) -> Result<MachineDefinition, ParseError> {
    parse_document(input, settings).map(|(def, _)| def)
}

/// Parses a configuration and the authorship comments at its top, if present.
///
/// Metadata is returned only when both the creator and a valid RFC 3339 timestamp are found.
pub fn parse_document(
    input: &str,
    settings: Settings,
) -> Result<(MachineDefinition, Option<Metadata>), ParseError> {
    let mut def = MachineDefinition::new(settings);
    let mut seen = BTreeSet::new();
    let mut current: Option<Section> = None;
    let mut start_lines = Vec::new();
    let mut creator = None;
    let mut created_at = None;

    for line in input.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            let comment = comment.trim();
            if let Some(name) = comment.strip_prefix(CREATOR_PREFIX) {
                creator = Some(name.trim().to_string());
            } else if let Some(timestamp) = comment.strip_prefix(CREATED_AT_PREFIX) {
                created_at = parse_timestamp(timestamp.trim());
            }
            continue;
        }

        if let Some(section) = Section::from_header(line) {
            seen.insert(section);
            current = Some(section);
            continue;
        }

        let section = current.ok_or_else(|| ParseError::OrphanLine(line.to_string()))?;
        match section {
            Section::States => def.states.extend(tokens(line).map(String::from)),
            Section::Accept => def.accept_states.extend(tokens(line).map(String::from)),
            Section::Reject => def.reject_states.extend(tokens(line).map(String::from)),
            Section::InputAlphabet => def.input_alphabet.extend(parse_symbols(line, section)?),
            Section::TapeAlphabet => def.tape_alphabet.extend(parse_symbols(line, section)?),
            Section::Start => start_lines.push(line),
            Section::Transitions => {
                let ((state, symbol), transition) = parse_transition(line)?;
                if let Some(previous) = def.add_transition(
                    state.clone(),
                    symbol,
                    transition.next_state,
                    transition.write,
                    transition.direction,
                ) {
                    warn!(
                        state = %state,
                        symbol = %symbol,
                        replaced = ?previous,
                        "Duplicate transition, keeping the last definition"
                    );
                }
            }
        }
    }

    if let Some(missing) = Section::ALL
        .into_iter()
        .find(|section| section.is_required() && !seen.contains(section))
    {
        return Err(ParseError::MissingSection(missing.name().to_string()));
    }

    def.start_state = parse_start(&start_lines)?;

    validate(&def)?;

    let metadata = creator
        .zip(created_at)
        .map(|(creator, created_at)| Metadata::new(creator, created_at));

    Ok((def, metadata))
}

/// Splits a list line into trimmed, non-empty tokens.
fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(str::trim).filter(|token| !token.is_empty())
}

/// Parses an alphabet line; every token must be a single character.
fn parse_symbols(line: &str, section: Section) -> Result<Vec<char>, ParseError> {
    tokens(line)
        .map(|token| {
            parse_symbol(token)
                .ok_or_else(|| ParseError::MalformedSection(section.name().to_string()))
        })
        .collect()
}

/// The `Start` section must hold exactly one line naming exactly one state.
fn parse_start(lines: &[&str]) -> Result<String, ParseError> {
    let malformed = || ParseError::MalformedSection(Section::Start.name().to_string());

    let [line] = lines else {
        return Err(malformed());
    };

    let mut states = tokens(line);
    match (states.next(), states.next()) {
        (Some(state), None) => Ok(state.to_string()),
        _ => Err(malformed()),
    }
}

/// Parses `state,symbol -> next_state,write,direction`.
fn parse_transition(line: &str) -> Result<((String, char), Transition), ParseError> {
    let malformed = || ParseError::MalformedTransition(line.to_string());

    let pair = ConfigParser::parse(Rule::transition, line)
        .map_err(|_| malformed())?
        .next()
        .ok_or_else(malformed)?;

    let mut parts = pair
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .map(|p| p.as_str());
    let mut next = || parts.next().ok_or_else(malformed);

    let state = next()?.to_string();
    let read = parse_symbol(next()?).ok_or_else(malformed)?;
    let next_state = next()?.to_string();
    let write = parse_symbol(next()?).ok_or_else(malformed)?;
    let direction = next()?.parse::<Direction>().map_err(|_| malformed())?;

    Ok(((state, read), Transition::new(next_state, write, direction)))
}

/// Returns the character of a one-character token.
fn parse_symbol(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Some(symbol),
        _ => None,
    }
}

fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValidationError;

    const EXAMPLE: &str = r#"
# Comments start with #
States:
q1,q2,q3,accept,reject
Input Alphabet:
0,1
Tape Alphabet:
0,1,X,Y,_
Start:
q1
Accept:
accept
Reject:
reject
Transitions:
q1,0 -> q2,X,R
q2,1 -> q3,Y,L
q3,X -> q1,X,R
"#;

    #[test]
    fn test_parse_example_configuration() {
        let def = parse(EXAMPLE).unwrap();

        assert_eq!(def.states.len(), 5);
        assert_eq!(def.input_alphabet, BTreeSet::from(['0', '1']));
        assert_eq!(def.tape_alphabet, BTreeSet::from(['0', '1', 'X', 'Y', '_']));
        assert_eq!(def.start_state, "q1");
        assert!(def.is_accept("accept"));
        assert!(def.is_reject("reject"));
        assert_eq!(def.transitions.len(), 3);
        assert_eq!(
            def.transition("q2", '1'),
            Some(&Transition::new("q3", 'Y', Direction::Left))
        );
    }

    #[test]
    fn test_sections_are_order_independent_and_merged() {
        let input = r#"
Transitions:
q0,a -> done,a,R
Start:
q0
States:
q0
Tape Alphabet:
a
Input Alphabet:
a
States:
done
Accept:
done
Tape Alphabet:
_
"#;
        let def = parse(input).unwrap();

        assert_eq!(def.states, BTreeSet::from(["q0".to_string(), "done".to_string()]));
        assert_eq!(def.tape_alphabet, BTreeSet::from(['a', '_']));
        assert!(def.reject_states.is_empty());
    }

    #[test]
    fn test_list_tokens_are_trimmed_and_empty_tokens_dropped() {
        let input = EXAMPLE.replace("q1,q2,q3,accept,reject", " q1 , q2,, q3 ,accept, reject, ");
        let def = parse(&input).unwrap();

        assert_eq!(def.states.len(), 5);
        assert!(def.states.contains("q3"));
    }

    #[test]
    fn test_transition_allows_spaces() {
        let input = EXAMPLE.replace("q1,0 -> q2,X,R", "q1 , 0->q2 , X , R");
        let def = parse(&input).unwrap();

        assert_eq!(
            def.transition("q1", '0'),
            Some(&Transition::new("q2", 'X', Direction::Right))
        );
    }

    #[test]
    fn test_missing_section() {
        let input = EXAMPLE.replace("Accept:\naccept\n", "");
        assert_eq!(
            parse(&input),
            Err(ParseError::MissingSection("Accept".into()))
        );
    }

    #[test]
    fn test_missing_sections_reported_in_canonical_order() {
        assert_eq!(
            parse("# nothing here"),
            Err(ParseError::MissingSection("States".into()))
        );
    }

    #[test]
    fn test_reject_section_is_optional() {
        let input = EXAMPLE
            .replace("Reject:\nreject\n", "")
            .replace("q1,q2,q3,accept,reject", "q1,q2,q3,accept");
        let def = parse(&input).unwrap();

        assert!(def.reject_states.is_empty());
    }

    #[test]
    fn test_start_with_multiple_lines_is_malformed() {
        let input = EXAMPLE.replace("Start:\nq1\n", "Start:\nq1\nq2\n");
        assert_eq!(
            parse(&input),
            Err(ParseError::MalformedSection("Start".into()))
        );
    }

    #[test]
    fn test_start_with_multiple_states_is_malformed() {
        let input = EXAMPLE.replace("Start:\nq1\n", "Start:\nq1,q2\n");
        assert_eq!(
            parse(&input),
            Err(ParseError::MalformedSection("Start".into()))
        );
    }

    #[test]
    fn test_empty_start_is_malformed() {
        let input = EXAMPLE.replace("Start:\nq1\n", "Start:\n");
        assert_eq!(
            parse(&input),
            Err(ParseError::MalformedSection("Start".into()))
        );
    }

    #[test]
    fn test_multi_character_symbol_is_malformed() {
        let input = EXAMPLE.replace("0,1,X,Y,_", "0,1,XY,_");
        assert_eq!(
            parse(&input),
            Err(ParseError::MalformedSection("Tape Alphabet".into()))
        );
    }

    #[test]
    fn test_malformed_transitions() {
        for line in [
            "q1,0 -> q2,X",
            "q1,0 -> q2,X,S",
            "q1,00 -> q2,X,R",
            "q1 0 -> q2,X,R",
            "q1,0 => q2,X,R",
            "q1,0 -> q2,X,R,extra",
        ] {
            let input = EXAMPLE.replace("q3,X -> q1,X,R", line);
            assert_eq!(
                parse(&input),
                Err(ParseError::MalformedTransition(line.into())),
                "line: {line}"
            );
        }
    }

    #[test]
    fn test_duplicate_transition_last_wins() {
        let input = format!("{EXAMPLE}q1,0 -> q3,Y,L\n");
        let def = parse(&input).unwrap();

        assert_eq!(def.transitions.len(), 3);
        assert_eq!(
            def.transition("q1", '0'),
            Some(&Transition::new("q3", 'Y', Direction::Left))
        );
    }

    #[test]
    fn test_line_before_any_section() {
        let input = format!("q1,q2\n{EXAMPLE}");
        assert_eq!(parse(&input), Err(ParseError::OrphanLine("q1,q2".into())));
    }

    #[test]
    fn test_validation_failure_is_wrapped() {
        let input = EXAMPLE.replace("Start:\nq1\n", "Start:\nq9\n");
        assert_eq!(
            parse(&input),
            Err(ParseError::Invalid(ValidationError::UnknownStartState(
                "q9".into()
            )))
        );
    }

    #[test]
    fn test_custom_blank_symbol() {
        let settings = Settings::new('B', 0, Direction::Right).unwrap();
        let input = EXAMPLE.replace("0,1,X,Y,_", "0,1,X,Y,B");

        assert!(parse_with(&input, settings).is_ok());
        assert!(matches!(
            parse(&input),
            Err(ParseError::Invalid(ValidationError::AlphabetInconsistency(_)))
        ));
    }

    #[test]
    fn test_parse_metadata_comments() {
        let input = format!(
            "# Created by: alice\n# Created at: 2024-05-01T12:30:00Z\n{EXAMPLE}"
        );
        let (_, metadata) = parse_document(&input, Settings::default()).unwrap();
        let metadata = metadata.unwrap();

        assert_eq!(metadata.creator, "alice");
        assert_eq!(metadata.created_at.to_rfc3339(), "2024-05-01T12:30:00+00:00");
    }

    #[test]
    fn test_incomplete_metadata_is_ignored() {
        let input = format!("# Created by: alice\n# Created at: yesterday\n{EXAMPLE}");
        let (_, metadata) = parse_document(&input, Settings::default()).unwrap();

        assert!(metadata.is_none());
    }
}
