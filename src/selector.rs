use crate::dataset::{ClassIndex, DatasetSource, RaceIndex};
use crate::error::{GenError, Result};
use crate::messages::Notice;
use log::{debug, info};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

/// Publication codes whose races, classes and subclasses may be picked.
pub const OFFICIAL_SOURCES: &[&str] = &[
    "PHB", "XGE", "TCE", "SCAG", "DMG", "VGM", "MTOF", "FTD", "AI", "BGDIA", "OOTDQ", "WBtW",
    "SACoC", "MPMM", "RMR", "LR",
];

/// Class index entries containing any of these (case-insensitive) are never fetched.
pub const BANNED_TOKENS: &[&str] = &["sidekick", "mystic"];

pub const EXCLUDED_RACE: &str = "Custom Lineage";

pub fn is_official(source: Option<&str>) -> bool {
    source.is_some_and(|s| OFFICIAL_SOURCES.contains(&s))
}

pub fn eligible_races(index: &RaceIndex) -> Vec<&str> {
    index
        .race
        .iter()
        .filter(|r| is_official(r.source.as_deref()) && r.name != EXCLUDED_RACE)
        .map(|r| r.name.as_str())
        .collect()
}

pub fn pick_race<R: Rng + ?Sized>(index: &RaceIndex, rng: &mut R) -> Result<String> {
    let races = eligible_races(index);
    races
        .choose(rng)
        .map(|name| name.to_string())
        .ok_or(GenError::EmptyPool("race"))
}

pub fn is_class_candidate(key: &str, file: &str) -> bool {
    let key = key.to_lowercase();
    let file = file.to_lowercase();
    !BANNED_TOKENS
        .iter()
        .any(|t| key.contains(t) || file.contains(t))
}

/// File references of every class worth fetching, in index order.
pub fn class_candidates(index: &ClassIndex) -> Vec<&str> {
    index
        .iter()
        .filter(|(key, file)| is_class_candidate(key, file))
        .map(|(_, file)| file.as_str())
        .collect()
}

/// Returns `"Class (Subclass)"`, or the no-class sentinel when nothing in the
/// index has both an official class and an official subclass.
///
/// Candidates are visited in a random order and fetched one at a time; the
/// first one that qualifies wins. Fetch errors abort the pick.
pub async fn pick_class_subclass<R: Rng + Send + ?Sized>(
    index: &ClassIndex,
    dataset: &dyn DatasetSource,
    rng: &mut R,
) -> Result<String> {
    let mut candidates = class_candidates(index);
    if candidates.is_empty() {
        info!("Class index has no candidates");
        return Ok(Notice::NoValidClass.to_string());
    }

    candidates.shuffle(rng);

    for file in candidates {
        let detail = dataset.class_detail(file).await?;
        let Some(info) = detail.class.first() else {
            debug!("Skipping {}: no class record", file);
            continue;
        };
        if !is_official(info.source.as_deref()) {
            debug!("Skipping {}: unofficial source {:?}", file, info.source);
            continue;
        }

        let subclasses: Vec<&str> = detail
            .subclass
            .iter()
            .filter(|s| is_official(s.source.as_deref()))
            .map(|s| s.name.as_str())
            .collect();

        if let Some(subclass) = subclasses.choose(rng) {
            return Ok(format!("{} ({})", info.name, subclass));
        }
        debug!("Skipping {}: no official subclasses", file);
    }

    Ok(Notice::NoValidClass.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::mock::{detail, race, MockDataset};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn index_of(entries: &[(&str, &str)]) -> ClassIndex {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_pick_race_skips_excluded_lineage() {
        let index = RaceIndex {
            race: vec![race("Elf", "PHB"), race("Custom Lineage", "PHB")],
        };

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(pick_race(&index, &mut rng).unwrap(), "Elf");
        }
    }

    #[test]
    fn test_pick_race_only_official_sources() {
        let index = RaceIndex {
            race: vec![
                race("Dwarf", "PHB"),
                race("Kender", "DSotDQ"),
                race("Owlin", "SCC"),
                race("Tabaxi", "MPMM"),
                race("Variant Human", "phb"),
            ],
        };

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let picked = pick_race(&index, &mut rng).unwrap();
            assert!(picked == "Dwarf" || picked == "Tabaxi", "picked {}", picked);
        }
    }

    #[test]
    fn test_pick_race_empty_pool() {
        let index = RaceIndex {
            race: vec![race("Custom Lineage", "TCE"), race("Kender", "DSotDQ")],
        };
        let mut rng = StdRng::seed_from_u64(1);

        let err = pick_race(&index, &mut rng).unwrap_err();
        assert!(matches!(err, GenError::EmptyPool("race")));
    }

    #[test]
    fn test_class_candidates_drop_banned_tokens() {
        let index = index_of(&[
            ("Fighter", "class-fighter.json"),
            ("Sidekick (Expert)", "class-sidekick.json"),
            ("psion", "class-MYSTIC.json"),
            ("Wizard", "class-wizard.json"),
        ]);

        let candidates = class_candidates(&index);
        assert_eq!(candidates, vec!["class-fighter.json", "class-wizard.json"]);
    }

    #[tokio::test]
    async fn test_empty_candidates_return_sentinel_without_fetching() {
        let dataset = MockDataset::default();
        let index = index_of(&[("sidekick", "class-sidekick.json")]);
        let mut rng = StdRng::seed_from_u64(3);

        let picked = pick_class_subclass(&index, &dataset, &mut rng).await.unwrap();
        assert_eq!(picked, "No valid class found");
        assert!(dataset.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unofficial_classes_and_subclasses_are_skipped() {
        let mut dataset = MockDataset::default();
        dataset.details.insert(
            "class-fighter.json".to_string(),
            detail(("Fighter", "PHB"), &[("Gunslinger", "TDCSR"), ("Champion", "PHB")]),
        );
        dataset.details.insert(
            "class-homebrew.json".to_string(),
            detail(("Homebrew", "HB"), &[("Anything", "PHB")]),
        );
        dataset.details.insert(
            "class-barren.json".to_string(),
            detail(("Barren", "PHB"), &[("Unofficial", "UA")]),
        );
        let index = index_of(&[
            ("Fighter", "class-fighter.json"),
            ("Homebrew", "class-homebrew.json"),
            ("Barren", "class-barren.json"),
        ]);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = pick_class_subclass(&index, &dataset, &mut rng).await.unwrap();
            assert_eq!(picked, "Fighter (Champion)");
        }
    }

    #[tokio::test]
    async fn test_no_qualifying_class_returns_sentinel() {
        let mut dataset = MockDataset::default();
        dataset.details.insert(
            "class-a.json".to_string(),
            detail(("A", "UA"), &[("A1", "PHB")]),
        );
        dataset.details.insert(
            "class-b.json".to_string(),
            detail(("B", "PHB"), &[("B1", "UA")]),
        );
        let index = index_of(&[
            ("A", "class-a.json"),
            ("B", "class-b.json"),
            ("C", "class-c.json"),
        ]);
        let mut rng = StdRng::seed_from_u64(11);

        let picked = pick_class_subclass(&index, &dataset, &mut rng).await.unwrap();
        assert_eq!(picked, Notice::NoValidClass.as_str());
        assert_eq!(dataset.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_stops_after_first_match() {
        let mut dataset = MockDataset::default();
        for name in ["a", "b", "c", "d"] {
            dataset.details.insert(
                format!("class-{}.json", name),
                detail((name, "PHB"), &[("Sub", "XGE")]),
            );
        }
        let index = index_of(&[
            ("a", "class-a.json"),
            ("b", "class-b.json"),
            ("c", "class-c.json"),
            ("d", "class-d.json"),
        ]);
        let mut rng = StdRng::seed_from_u64(5);

        let picked = pick_class_subclass(&index, &dataset, &mut rng).await.unwrap();
        assert!(picked.ends_with(" (Sub)"));
        assert_eq!(dataset.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let dataset = MockDataset {
            fail_on: Some("class-fighter.json".to_string()),
            ..Default::default()
        };
        let index = index_of(&[("Fighter", "class-fighter.json")]);
        let mut rng = StdRng::seed_from_u64(2);

        let err = pick_class_subclass(&index, &dataset, &mut rng)
            .await
            .unwrap_err();
        assert!(err.is_network());
    }
}
