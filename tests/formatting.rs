use sigblock::department::Department;
use sigblock::fields::{Field, SignatureFields};
use sigblock::format::{capitalize_words, format_display_name, format_phone, initials};
use sigblock::state::{Action, ButtonState, FormState};

#[test]
fn display_names_drop_particles_and_abbreviate() {
    let cases = [
        ("maria da silva santos", "Maria S. Santos"),
        ("JOSÉ DOS SANTOS", "José Santos"),
        ("ana", "Ana"),
        ("  joão   carlos  pereira  ", "João C. Pereira"),
        ("", "Nome Completo"),
        ("da dos", "Nome Completo"),
    ];
    for (raw, expected) in cases {
        assert_eq!(format_display_name(raw), expected, "input {:?}", raw);
    }
}

#[test]
fn initials_take_two_uppercase_letters() {
    assert_eq!(initials("maria da silva"), "MD");
    assert_eq!(initials("ana"), "A");
    assert_eq!(initials(""), "");
    assert_eq!(initials("joão  pereira"), "JP");
}

#[test]
fn phone_mask_is_idempotent() {
    for raw in ["2", "21", "2126", "212688", "2126881", "2126881234", "21988887777", "219888877771234"] {
        let once = format_phone(raw);
        assert_eq!(format_phone(&once), once, "input {:?}", raw);
    }
    assert_eq!(format_phone("219888877771234"), "(21) 98888-7777");
    assert_eq!(format_phone("abc"), "");
}

#[test]
fn roles_keep_minor_words_lowercase() {
    assert_eq!(capitalize_words("diretor de obras e serviços"), "Diretor de Obras e Serviços");
    assert_eq!(capitalize_words("de plantão"), "De Plantão");
}

#[test]
fn button_is_enabled_only_when_every_field_is_filled() {
    let mut state = FormState::default();
    let values = [
        (Field::Name, "Ana Souza"),
        (Field::Role, "Chefe de Gabinete"),
        (Field::Department, "gp"),
        (Field::Phone, "2126881234"),
        (Field::Address, "Rua B, 10"),
    ];
    for (i, (field, value)) in values.iter().enumerate() {
        assert!(!state.can_download(), "enabled before {:?} was filled", field);
        state = state.apply(Action::SetField(*field, value.to_string()));
        assert_eq!(state.fields().missing().len(), values.len() - i - 1);
    }
    assert!(state.can_download());
    assert_eq!(state.button(), ButtonState::Idle);
    assert_eq!(state.fields().department, Some(Department::Gp));

    let state = state.apply(Action::SetField(Field::Address, "   ".into()));
    assert!(!state.can_download());
}

#[test]
fn fields_load_from_json_with_blank_department() {
    let fields: SignatureFields =
        serde_json::from_str(r#"{"name": "Ana", "department": ""}"#).unwrap();
    assert_eq!(fields.department, None);
    assert_eq!(
        fields.missing(),
        vec![Field::Role, Field::Department, Field::Phone, Field::Address]
    );
}

#[test]
fn every_department_round_trips_through_its_label() {
    assert_eq!(Department::ALL.len(), 24);
    for d in Department::ALL {
        assert_eq!(d.label().parse::<Department>().unwrap(), d);
        assert_eq!(d.acronym().to_lowercase().parse::<Department>().unwrap(), d);
    }
}
