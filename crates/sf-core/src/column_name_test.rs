use super::*;

#[test]
fn test_try_new_rejects_empty() {
    assert!(ColumnName::try_new("").is_none());
    assert_eq!(ColumnName::try_new("Codigo").unwrap(), "Codigo");
}

#[test]
fn test_matches_is_case_insensitive() {
    let name = ColumnName::new("Fecha_de_Consulta");
    assert!(name.matches("fecha_de_consulta"));
    assert!(name.matches("FECHA_DE_CONSULTA"));
    assert!(!name.matches("Fecha_Consulta"));
}

#[test]
fn test_deserialize_rejects_empty() {
    let parsed: Result<ColumnName, _> = serde_yaml::from_str("\"\"");
    assert!(parsed.is_err());

    let parsed: ColumnName = serde_yaml::from_str("Estado").unwrap();
    assert_eq!(parsed.as_str(), "Estado");
}

#[test]
fn test_serializes_transparently() {
    let yaml = serde_yaml::to_string(&ColumnName::new("Estado")).unwrap();
    assert_eq!(yaml.trim(), "Estado");
}

#[test]
fn test_equality_and_hash_ignore_case() {
    use std::collections::HashSet;

    assert_eq!(ColumnName::new("Codigo"), ColumnName::new("CODIGO"));
    assert_eq!(ColumnName::new("Codigo"), "codigo");
    assert_ne!(ColumnName::new("Codigo"), ColumnName::new("Codigo_Cita"));

    let set: HashSet<ColumnName> = ["Estado", "estado", "ESTADO", "Motivo"]
        .into_iter()
        .map(ColumnName::new)
        .collect();
    assert_eq!(set.len(), 2);
    assert!(set.contains(&ColumnName::new("motivo")));
}

#[test]
fn test_ordering_ignores_case() {
    let mut names = vec![
        ColumnName::new("b"),
        ColumnName::new("A"),
        ColumnName::new("c"),
    ];
    names.sort();
    let sorted: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
    assert_eq!(sorted, ["A", "b", "c"]);
    assert_eq!(
        ColumnName::new("x").cmp(&ColumnName::new("X")),
        std::cmp::Ordering::Equal
    );
}
