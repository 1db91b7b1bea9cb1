use super::*;

const VALID_YAML: &str = r"
name: Vallarta Vows
description: premier wedding planning agency in Puerto Vallarta, Mexico
founder:
  name: Robin Manoogian
  title: Founder
  experience: 15+ years of experience
contact_lines:
  - 'WhatsApp USA: +1 (646) 216-8516'
  - 'vallartavows.com'
specialties:
  - service: Catering Menu
    knowledge: Taco Night, Mexican Buffet, Vegan & Plant-Based menus.
    image_direction: Close-up glossy food photography
";

#[test]
fn parse_valid_profile() {
    let profile = parse_brand_profile(VALID_YAML).expect("valid profile");
    assert_eq!(profile.name, "Vallarta Vows");
    assert_eq!(profile.min_hashtags, 15, "min_hashtags defaults to 15");
    assert_eq!(profile.contact_lines.len(), 2);
    assert_eq!(profile.specialties.len(), 1);
}

#[test]
fn specialty_lookup_is_case_insensitive() {
    let profile = parse_brand_profile(VALID_YAML).unwrap();
    assert!(profile.specialty_for("catering menu").is_some());
    assert!(profile.specialty_for(" Catering Menu ").is_some());
    assert!(profile.specialty_for("Private Villa").is_none());
}

#[test]
fn empty_name_fails_validation() {
    let yaml = VALID_YAML.replace("name: Vallarta Vows", "name: '  '");
    let err = parse_brand_profile(&yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("brand name")));
}

#[test]
fn missing_contact_lines_fails_validation() {
    let yaml = r"
name: Brand
description: d
founder: { name: F, title: Founder, experience: long }
contact_lines: []
";
    let err = parse_brand_profile(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("contact line")));
}

#[test]
fn duplicate_specialty_fails_validation() {
    let yaml = r"
name: Brand
description: d
founder: { name: F, title: Founder, experience: long }
contact_lines: [call us]
specialties:
  - { service: Catering Menu, knowledge: tacos }
  - { service: catering menu, knowledge: churros }
";
    let err = parse_brand_profile(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate")));
}

#[test]
fn malformed_yaml_is_parse_error() {
    let err = parse_brand_profile("name: [unterminated").unwrap_err();
    assert!(matches!(err, ConfigError::BrandFileParse(_)));
}

#[test]
fn missing_file_is_io_error() {
    let err = load_brand_profile(Path::new("/nonexistent/brand.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::BrandFileIo { .. }));
}

#[test]
fn shipped_profile_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/brand.yaml");
    let profile = load_brand_profile(&path).expect("config/brand.yaml should validate");
    assert!(profile.specialty_for("Catering Menu").is_some());
}
