use crate::dbc::core::strings::{record_body, split_fields, un_quote};
use crate::dbc::types::{errors::RecordError, pending::PendingDefault, state::ParseState};

/// Decode a `BA_DEF_DEF_` line.
/// Expected formats:
/// BA_DEF_DEF_  "DBName" "";
/// BA_DEF_DEF_  "GenMsgCycleTime" 0;
/// BA_DEF_DEF_  "VFrameFormat" "StandardCAN_FD";
///
/// A default for a not yet declared attribute is held until its `BA_DEF_` arrives.
pub(crate) fn decode(state: &mut ParseState, text: &str) -> Result<(), RecordError> {
    let relation: bool = text.trim_start().starts_with("BA_DEF_DEF_REL_");
    let keyword: &str = if relation {
        "BA_DEF_DEF_REL_"
    } else {
        "BA_DEF_DEF_"
    };
    let fields: Vec<String> = split_fields(record_body(text, keyword));

    let name: &str = fields
        .first()
        .map(|f| un_quote(f))
        .ok_or(RecordError::MissingField { field: "attribute name" })?;
    if relation {
        return Err(RecordError::RelationAttribute {
            name: name.to_string(),
        });
    }
    let raw: &str = fields
        .get(1)
        .map(String::as_str)
        .ok_or(RecordError::MissingField { field: "attribute default" })?;

    match state.definitions.get_mut(name) {
        Some(definition) => definition.set_default(raw),
        None => {
            let line: usize = state.line;
            state.pending.defaults.push(PendingDefault {
                name: name.to_string(),
                raw: raw.to_string(),
                line,
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::core::attributes::ba_def_;
    use crate::dbc::types::{attributes::AttributeValue, options::ParseOptions};

    #[test]
    fn test_decode_defaults() {
        let mut state = ParseState::new("a.dbc", ParseOptions::default());
        ba_def_::decode(&mut state, "BA_DEF_ BO_ \"GenMsgCycleTime\" INT 0 65535;").unwrap();
        ba_def_::decode(&mut state, "BA_DEF_ \"DBName\" STRING;").unwrap();
        ba_def_::decode(
            &mut state,
            "BA_DEF_ BO_ \"VFrameFormat\" ENUM \"StandardCAN\",\"StandardCAN_FD\";",
        )
        .unwrap();

        decode(&mut state, "BA_DEF_DEF_ \"GenMsgCycleTime\" 10.0;").unwrap();
        decode(&mut state, "BA_DEF_DEF_ \"DBName\" \"\";").unwrap();
        decode(&mut state, "BA_DEF_DEF_ \"VFrameFormat\" \"StandardCAN_FD\";").unwrap();

        assert_eq!(
            state.definitions["GenMsgCycleTime"].default_value(),
            Some(AttributeValue::Int(10))
        );
        assert_eq!(
            state.definitions["DBName"].default_value(),
            Some(AttributeValue::String(String::new()))
        );
        assert_eq!(
            state.definitions["VFrameFormat"].default_value(),
            Some(AttributeValue::Enum {
                index: 1,
                label: "StandardCAN_FD".into()
            })
        );
        assert!(matches!(
            decode(&mut state, "BA_DEF_DEF_ \"VFrameFormat\" \"Nope\";"),
            Err(RecordError::InvalidEnumValue { .. })
        ));
    }

    #[test]
    fn test_default_before_definition_is_held() {
        let mut state = ParseState::new("a.dbc", ParseOptions::default());
        state.line = 7;
        decode(&mut state, "BA_DEF_DEF_ \"Late\" 5;").unwrap();
        assert_eq!(state.pending.defaults[0].line, 7);
        assert_eq!(
            decode(&mut state, "BA_DEF_DEF_REL_ \"Rel\" 0;"),
            Err(RecordError::RelationAttribute { name: "Rel".into() })
        );
    }
}
