use std::path::PathBuf;
use std::sync::OnceLock;

use cardio_model::Region;
use cardio_standards::{ExclusionScope, StandardsRegistry};
use proptest::prelude::*;

fn registry() -> &'static StandardsRegistry {
    static REGISTRY: OnceLock<StandardsRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../standards");
        StandardsRegistry::verify_and_load(&dir)
            .expect("shipped standards verify")
            .0
    })
}

#[test]
fn shipped_manifest_checksums_match() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../standards");
    let (_, summary) = StandardsRegistry::verify_and_load(&dir).unwrap();
    assert_eq!(summary.file_count, 5);
    assert_eq!(summary.country_count, 249);
}

#[test]
fn resolves_source_spellings() {
    let resolver = &registry().resolver;
    let cases = [
        ("Korea, Rep.", "KOR"),
        ("Republic of Korea", "KOR"),
        ("United States of America", "USA"),
        ("united states", "USA"),
        ("Russian Federation", "RUS"),
        ("Russia", "RUS"),
        ("Viet Nam", "VNM"),
        ("Cote d'Ivoire", "CIV"),
        ("Côte d'Ivoire", "CIV"),
        ("Iran (Islamic Republic of)", "IRN"),
        ("Kosovo", "XKX"),
        ("Turkey", "TUR"),
        ("Bolivia", "BOL"),
    ];
    for (name, code) in cases {
        assert_eq!(resolver.resolve(name), Some(code), "{name}");
    }
    assert_eq!(resolver.resolve("Channel Islands"), None);
    assert_eq!(resolver.resolve("World"), None);
}

#[test]
fn every_code_round_trips_through_its_display_name() {
    let resolver = &registry().resolver;
    for code in resolver.codes() {
        let name = resolver.display_name(code).expect("display name");
        assert_eq!(resolver.resolve(name), Some(code), "{code} via {name}");
    }
}

#[test]
fn regions_follow_continents_and_overrides() {
    let classifier = &registry().classifier;
    assert_eq!(classifier.region_of("USA"), Region::NorthAmerica);
    assert_eq!(classifier.region_of("BRA"), Region::SouthAmerica);
    assert_eq!(classifier.region_of("NGA"), Region::Africa);
    assert_eq!(classifier.region_of("AUS"), Region::Oceania);
    assert_eq!(classifier.region_of("XKX"), Region::Europe);
    assert_eq!(classifier.region_of("OWID_KOS"), Region::Europe);
    assert_eq!(classifier.region_of("SXM"), Region::NorthAmerica);
    assert_eq!(classifier.region_of("TLS"), Region::Asia);
    assert_eq!(classifier.region_of("UMI"), Region::Unknown);
}

#[test]
fn exclusions_cover_aggregates_and_territories() {
    let exclusions = &registry().exclusions;
    assert!(exclusions.is_excluded("World", ExclusionScope::Aggregate));
    assert!(exclusions.is_excluded("Eastern Mediterranean", ExclusionScope::Aggregate));
    assert!(exclusions.is_excluded("Channel Islands", ExclusionScope::WorldHealth));
    assert!(!exclusions.is_excluded("France", ExclusionScope::Aggregate));
}

proptest! {
    #[test]
    fn region_of_is_total(code in "[A-Za-z_]{0,8}") {
        let region = registry().classifier.region_of(&code);
        prop_assert!(Region::ALL.contains(&region));
    }

    #[test]
    fn resolve_ignores_case_and_spacing(
        index in 0usize..249,
        upper in any::<bool>(),
        pad in "[ \t]{0,3}",
    ) {
        let resolver = &registry().resolver;
        let code = resolver.codes().nth(index).unwrap();
        let name = resolver.display_name(code).unwrap();
        let variant = if upper { name.to_uppercase() } else { name.to_lowercase() };
        let variant = format!("{pad}{}{pad}", variant.replace(' ', "  "));
        prop_assert_eq!(resolver.resolve(&variant), resolver.resolve(name));
    }
}
