//! This module writes a `MachineDefinition` back into the configuration format read by
//! [`crate::parser`].
//!
//! Output is deterministic: sections appear in canonical order, set members are sorted and
//! transitions are listed by `(state, symbol)`.

use crate::definition::MachineDefinition;
use crate::parser::{Section, CREATED_AT_PREFIX, CREATOR_PREFIX};
use crate::types::Metadata;

const TITLE: &str = "# Turing Machine configuration";

/// Serializes `def` into configuration lines.
///
/// Metadata, when given, is written as comments after the title line; the parser reads it
/// back with [`crate::parser::parse_document`].
///
/// # Arguments
///
/// * `def` - The definition to serialize.
/// * `metadata` - Optional authorship information supplied by the caller.
///
/// # Returns
///
/// * `Vec<String>` - One entry per line, without line terminators.
pub fn serialize(def: &MachineDefinition, metadata: Option<&Metadata>) -> Vec<String> {
    let mut lines = vec![TITLE.to_string()];

    if let Some(metadata) = metadata {
        lines.push(format!("# {} {}", CREATOR_PREFIX, metadata.creator));
        lines.push(format!(
            "# {} {}",
            CREATED_AT_PREFIX,
            metadata.created_at.to_rfc3339()
        ));
    }

    for section in Section::ALL {
        lines.push(format!("{}:", section.name()));

        let body = match section {
            Section::States => join(&def.states),
            Section::InputAlphabet => join(&def.input_alphabet),
            Section::TapeAlphabet => join(&def.tape_alphabet),
            Section::Start => def.start_state.clone(),
            Section::Accept => join(&def.accept_states),
            Section::Reject => join(&def.reject_states),
            Section::Transitions => {
                lines.extend(encode_transitions(def));
                continue;
            }
        };

        if !body.is_empty() {
            lines.push(body);
        }
    }

    lines
}

/// Serializes `def` into a single newline-terminated string.
pub fn to_text(def: &MachineDefinition, metadata: Option<&Metadata>) -> String {
    let mut text = serialize(def, metadata).join("\n");
    text.push('\n');
    text
}

/// Renders each transition as `state,symbol -> next_state,write,direction`.
fn encode_transitions(def: &MachineDefinition) -> impl Iterator<Item = String> + '_ {
    def.transitions.iter().map(|((state, symbol), transition)| {
        format!(
            "{},{} -> {},{},{}",
            state, symbol, transition.next_state, transition.write, transition.direction
        )
    })
}

/// Joins the members of an ordered set with commas.
fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
