// src/lib.rs
//
// Calcul & format : bibliothèque
// ------------------------------
// But:
// - afficher une réponse numérique dans une base (2..=36) : largeur, fraction,
//   groupes, préfixe, chiffres exacts, séparateurs localisés
// - évaluer des formules à variables `{nom}` insérées dans du texte libre,
//   après validation stricte (liste blanche de fonctions, arités)
//
// Aucun état global : les réglages sont passés explicitement.
// Journalisation via la façade `log` ; l’hôte installe le logger.

pub mod noyau;

pub use noyau::{
    eval_expression, find_formula_errors, format_in_base, mask_value, parse_format_spec,
    valider_formule, Base, Erreur, FormatSpec, LecteurReponse, Reglages, ReponseLue,
    VariableSubstituter,
};
