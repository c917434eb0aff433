#![allow(dead_code)]

use grounder::{DisambiguationModel, EntityKey, Grounder, GrounderBuilder, GrounderConfig, Term, TermStatus};

pub fn go_er() -> EntityKey {
    EntityKey::new("GO", "GO:0005783")
}

pub fn esr1() -> EntityKey {
    EntityKey::new("HGNC", "3467")
}

pub fn egfr() -> EntityKey {
    EntityKey::new("HGNC", "3236")
}

pub fn terms() -> Vec<Term> {
    vec![
        Term::new("EGFR", "HGNC", "3236", "EGFR", TermStatus::Name, "hgnc"),
        Term::new("ERBB1", "HGNC", "3236", "EGFR", TermStatus::Previous, "hgnc"),
        Term::new("epidermal growth factor receptor", "HGNC", "3236", "EGFR", TermStatus::Synonym, "hgnc"),
        Term::new("EGFR", "MESH", "D066246", "ErbB Receptors", TermStatus::Synonym, "mesh"),
        Term::new("EGFR", "UP", "P00533", "EGFR", TermStatus::Name, "uniprot").with_organism("9606"),
        Term::new("EGFR", "UP", "Q01279", "Egfr", TermStatus::Name, "uniprot").with_organism("10090"),
        Term::new("endoplasmic reticulum", "GO", "GO:0005783", "endoplasmic reticulum", TermStatus::Name, "go"),
        Term::new("ER", "GO", "GO:0005783", "endoplasmic reticulum", TermStatus::Synonym, "go"),
        Term::new("ESR1", "HGNC", "3467", "ESR1", TermStatus::Name, "hgnc"),
        Term::new("ER", "HGNC", "3467", "ESR1", TermStatus::Synonym, "hgnc"),
        Term::new("estrogen receptor", "HGNC", "3467", "ESR1", TermStatus::Synonym, "hgnc"),
        Term::new("ER", "HGNC", "3467", "ESR1", TermStatus::Synonym, "uniprot")
            .with_source_grounding("UP", "P03372"),
        Term::new("kinase", "GO", "GO:0016301", "kinase activity", TermStatus::Synonym, "go"),
    ]
}

pub fn er_model() -> DisambiguationModel {
    DisambiguationModel::new("ER")
        .with_class(
            go_er(),
            0.0,
            [("calcium", 2.5), ("released", 1.0), ("lumen", 1.5), ("stress", 1.5), ("reticulum", 1.0)],
        )
        .with_class(
            esr1(),
            0.0,
            [("estrogen", 2.5), ("breast", 1.5), ("receptor", 1.0), ("tamoxifen", 2.0)],
        )
        .with_ungrounded_class(-2.0, [("emergency", 3.0), ("room", 1.0)])
}

pub fn grounder() -> Grounder {
    grounder_with(GrounderConfig::default())
}

pub fn grounder_with(config: GrounderConfig) -> Grounder {
    GrounderBuilder::new()
        .config(config)
        .terms(terms())
        .model(er_model())
        .build()
        .unwrap()
}
