mod helpers;

use helpers::{test_record, PoisonProvider, SpikeProvider};
use culina::dataset::Source;
use culina::embedding::EMBEDDING_DIM;
use culina::index::{builder, search, store};

#[test]
fn write_then_load_round_trip_keeps_labels_aligned() {
    let dir = tempfile::tempdir().unwrap();

    let records = vec![
        test_record(Source::Openrecipes, 0, "Pancakes", "flour\nmilk\neggs"),
        test_record(Source::Openrecipes, 1, "Lentil curry", "lentils\nonion"),
        test_record(Source::Wikibooks, 0, "Miso soup", "miso paste\ndashi"),
    ];
    let vectors = builder::build_vectors(&records, &SpikeProvider, 2, 1.5, None).unwrap();
    let meta = store::DatasetMeta::new("all-MiniLM-L6-v2", records.len());

    store::write(dir.path(), &records, &vectors, &meta).unwrap();

    // binary is exactly count * dim little-endian f32s
    let blob = std::fs::read(dir.path().join(store::EMBEDDINGS_FILE)).unwrap();
    assert_eq!(blob.len(), records.len() * EMBEDDING_DIM * 4);

    let loaded = store::load(dir.path()).unwrap();
    assert_eq!(loaded.meta.count, 3);
    assert_eq!(loaded.meta.dim, EMBEDDING_DIM);
    assert_eq!(loaded.meta.search, "brute-force-cosine");
    assert_eq!(loaded.records.len(), 3);
    assert_eq!(loaded.vectors, vectors);

    for (i, r) in loaded.records.iter().enumerate() {
        assert_eq!(r.label, i);
        assert_eq!(r.id, records[i].id);
        assert_eq!(r.title, records[i].title);
    }
}

#[test]
fn stored_vectors_are_unit_norm_or_zero_sentinel() {
    let dir = tempfile::tempdir().unwrap();

    let mut records = vec![
        test_record(Source::Openrecipes, 0, "Good soup", "water\nsalt"),
        test_record(Source::Openrecipes, 1, "Bad apple", "apples"),
    ];
    // force the second record's embedding document to contain the poison marker
    records[1].instructions = "poison this row but keep it over ten chars".into();

    let vectors = builder::build_vectors(&records, &PoisonProvider, 8, 1.5, None).unwrap();
    let meta = store::DatasetMeta::new("all-MiniLM-L6-v2", records.len());
    store::write(dir.path(), &records, &vectors, &meta).unwrap();

    let loaded = store::load(dir.path()).unwrap();
    for label in 0..loaded.meta.count {
        let row = &loaded.vectors[label * EMBEDDING_DIM..(label + 1) * EMBEDDING_DIM];
        let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!(
            (norm - 1.0).abs() < 1e-3 || norm == 0.0,
            "label {label} has norm {norm}"
        );
    }

    // the poisoned row is the zero sentinel, its sibling is intact
    let poisoned = &loaded.vectors[EMBEDDING_DIM..2 * EMBEDDING_DIM];
    assert!(poisoned.iter().all(|x| *x == 0.0));
    let good = &loaded.vectors[..EMBEDDING_DIM];
    assert!(good.iter().any(|x| *x != 0.0));
}

#[test]
fn zero_sentinel_never_outranks_real_vectors() {
    let records = vec![
        test_record(Source::Openrecipes, 0, "Match", "flour"),
        test_record(Source::Openrecipes, 1, "Sentinel", "salt"),
    ];
    let mut vectors = builder::build_vectors(&records, &SpikeProvider, 8, 1.5, None).unwrap();
    // overwrite the second row with the sentinel
    for x in &mut vectors[EMBEDDING_DIM..] {
        *x = 0.0;
    }

    let query = vectors[..EMBEDDING_DIM].to_vec();
    let hits = search::top_k(&query, &vectors, EMBEDDING_DIM, 2);
    assert_eq!(hits[0].0, 0);
    assert!((hits[0].1 - 1.0).abs() < 1e-6);
    assert_eq!(hits[1], (1, 0.0));
}

#[test]
fn load_rejects_tampered_label_order() {
    let dir = tempfile::tempdir().unwrap();

    let records = vec![
        test_record(Source::Openrecipes, 0, "A", "flour"),
        test_record(Source::Openrecipes, 1, "B", "milk"),
    ];
    let vectors = builder::build_vectors(&records, &SpikeProvider, 8, 1.5, None).unwrap();
    let meta = store::DatasetMeta::new("m", records.len());
    store::write(dir.path(), &records, &vectors, &meta).unwrap();

    // swap labels on disk
    let recipes_path = dir.path().join(store::RECIPES_FILE);
    let mut stored: Vec<store::StoredRecord> =
        serde_json::from_str(&std::fs::read_to_string(&recipes_path).unwrap()).unwrap();
    stored.swap(0, 1);
    std::fs::write(&recipes_path, serde_json::to_vec(&stored).unwrap()).unwrap();

    let err = store::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("label"));
}
