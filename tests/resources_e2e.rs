mod common;

use std::fs;
use std::path::Path;

use common::{er_model, go_er, terms};
use grounder::resources::{fingerprint, read_models_json, read_terms_tsv};
use grounder::{GrounderBuilder, GrounderConfig, LoadError, Term};

fn write_terms(path: &Path, terms: &[Term]) {
    let mut out = String::from("# norm_text\ttext\tdb\tid\tentry_name\tstatus\tsource\torganism\tsource_db\tsource_id\n");
    for t in terms {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            t.norm_text,
            t.text,
            t.db,
            t.id,
            t.entry_name,
            t.status,
            t.source,
            t.organism.as_deref().unwrap_or_default(),
            t.source_db.as_deref().unwrap_or_default(),
            t.source_id.as_deref().unwrap_or_default(),
        ));
    }
    fs::write(path, out).unwrap();
}

#[test]
fn terms_and_models_load_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let terms_path = dir.path().join("terms.tsv");
    let models_path = dir.path().join("models.json");
    write_terms(&terms_path, &terms());
    fs::write(&models_path, serde_json::to_vec(&vec![er_model()]).unwrap()).unwrap();

    let loaded = read_terms_tsv(&terms_path).unwrap();
    assert_eq!(loaded, terms());
    let models = read_models_json(&models_path).unwrap();
    assert_eq!(models, vec![er_model()]);

    let g = GrounderBuilder::new().terms(loaded).models(models).build().unwrap();
    let best = g
        .ground_best("ER", Some("Calcium is released from the ER."), &[])
        .unwrap();
    assert_eq!(best.key(), go_er());
    assert_eq!(g.info().fingerprint, fingerprint(&terms(), &[er_model()]));
}

#[test]
fn fingerprint_is_stable_across_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("terms.tsv");
    write_terms(&path, &terms());

    let a = GrounderBuilder::new().terms(read_terms_tsv(&path).unwrap()).build().unwrap();
    let b = GrounderBuilder::new().terms(read_terms_tsv(&path).unwrap()).build().unwrap();
    assert_eq!(a.info().fingerprint, b.info().fingerprint);

    let c = GrounderBuilder::new().terms(terms().into_iter().skip(1)).build().unwrap();
    assert_ne!(a.info().fingerprint, c.info().fingerprint);
}

#[test]
fn missing_files_are_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        read_terms_tsv(dir.path().join("absent.tsv")),
        Err(LoadError::Io { .. })
    ));
    assert!(matches!(
        read_models_json(dir.path().join("absent.json")),
        Err(LoadError::Io { .. })
    ));
}

#[test]
fn malformed_term_file_reports_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("terms.tsv");
    fs::write(
        &path,
        "egfr\tEGFR\tHGNC\t3236\tEGFR\tname\thgnc\nerbb1\tERBB1\tHGNC\t3236\tEGFR\tretired\thgnc\n",
    )
    .unwrap();
    let err = read_terms_tsv(&path).unwrap_err();
    assert!(matches!(err, LoadError::MalformedRow { line: 2, .. }), "{err:?}");
}

#[test]
fn model_for_unknown_entity_refuses_to_build() {
    let dir = tempfile::tempdir().unwrap();
    let models_path = dir.path().join("models.json");
    fs::write(
        &models_path,
        r#"[{"norm_text": "er", "classes": [
            {"entity": {"db": "GO", "id": "GO:0005783"}, "weights": {"calcium": 2.5}},
            {"entity": {"db": "MESH", "id": "D004721"}, "weights": {"emergency": 2.5}}
        ]}]"#,
    )
    .unwrap();

    let err = GrounderBuilder::new()
        .terms(terms())
        .models(read_models_json(&models_path).unwrap())
        .build()
        .unwrap_err();
    assert!(matches!(err, LoadError::UnknownModelEntity { .. }));
}

#[test]
fn config_file_controls_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grounder.json");
    fs::write(&path, r#"{"approximate_lookup": false, "merge_equivalent": false}"#).unwrap();

    let config = GrounderConfig::from_json_file(&path).unwrap();
    let g = GrounderBuilder::new().config(config).terms(terms()).build().unwrap();
    assert!(g.ground("kinases", None, &[]).is_empty());
    assert_eq!(g.ground("ER", None, &[]).len(), 3);
}
