//! Tests scientifiques (campagne) : propriétés de l’affichage, de la lecture et du calcul.
//!
//! But : vérifier les invariants sur des grilles de valeurs, sans faire chauffer la machine.
//! - budget temps global
//! - grilles bornées (valeurs, bases, largeurs, drapeaux)
//!
//! Notes :
//! - la lecture inverse travaille en f64 : on compare avec la demi-quantification
//!   `1/(2*base^fraction)` plus une marge relative minuscule
//! - fraction == 0 : la lecture doit rendre exactement l’arrondi (demi loin de zéro)

use std::time::{Duration, Instant};

use super::config::Reglages;
use super::fonctions::Arite;
use super::format::{format_in_base, mask_value, FormatSpec};
use super::lecture::LecteurReponse;
use super::substitution::VariableSubstituter;
use super::validation::{find_formula_errors, valider_formule};
use super::Erreur;

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

const BASES: [u32; 4] = [2, 8, 10, 16];

const VALEURS: [f64; 12] = [
    0.0, 1.0, -1.0, 22.375, 3.14159, -1234.5678, 1_000_000.5, 255.0, 0.001, 65535.99, -0.4, 7.0e12,
];

fn fmt(x: f64, spec: &FormatSpec) -> String {
    format_in_base(x, spec).unwrap_or_else(|e| panic!("x={x} spec={spec:?} err={e}"))
}

/* ------------------------ Aller-retour affichage -> lecture ------------------------ */

#[test]
fn sci_aller_retour_lecture() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);
    let reglages = Reglages::default();

    for base in BASES {
        let fixe = LecteurReponse::new(base, &reglages).unwrap();
        let detecte = LecteurReponse::new(0, &reglages).unwrap();

        for (entiers, fraction) in [(1, 0), (4, 2), (8, 4)] {
            for groupe in [0, 3, 4] {
                for prefixe in [false, true] {
                    budget(t0, max);

                    let mut spec = FormatSpec::new(base, entiers, fraction).groupe(groupe);
                    spec.prefixe = prefixe;

                    for x in VALEURS {
                        let txt = fmt(x, &spec);
                        let lu = fixe
                            .lire_valeur(&txt)
                            .unwrap_or_else(|| panic!("relecture refusée: {txt:?} (base {base})"));

                        if fraction == 0 {
                            assert_eq!(lu, x.round(), "txt={txt:?} x={x} base={base}");
                        } else {
                            let tol = 0.5 / (base as f64).powi(fraction as i32);
                            assert!(
                                (lu - x).abs() <= tol * (1.0 + 1e-9) + 1e-12 * x.abs(),
                                "txt={txt:?} x={x} lu={lu} base={base}"
                            );
                        }

                        // avec préfixe (ou en base 10), la détection retrouve la même valeur
                        if prefixe || base == 10 {
                            assert_eq!(detecte.lire_valeur(&txt), Some(lu), "txt={txt:?}");
                        }
                    }
                }
            }
        }
    }
}

/* ------------------------ Zéro jamais signé ------------------------ */

#[test]
fn sci_zero_sans_signe_toutes_bases() {
    for base in 2..=36 {
        for x in [0.0, -0.0, -1e-300] {
            assert_eq!(fmt(x, &FormatSpec::new(base, 1, 0)), "0", "base={base} x={x}");
        }
        assert!(!fmt(-0.001, &FormatSpec::new(base, 1, 1)).starts_with('-'));
    }
}

/* ------------------------ Masquage ------------------------ */

#[test]
fn sci_masque_idempotent() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    for base in [2, 8, 16] {
        for (entiers, fraction) in [(1, 0), (2, 1), (4, 4), (8, 0)] {
            budget(t0, max);
            for x in VALEURS {
                let (m1, tol1) = mask_value(x, base, entiers, fraction).unwrap();
                let (m2, tol2) = mask_value(m1, base, entiers, fraction).unwrap();
                assert_eq!(m1, m2, "x={x} base={base} {entiers}.{fraction}");
                assert_eq!(tol1, tol2);
                assert!(m1 >= 0.0, "masque négatif: x={x}");
            }
        }
    }
}

#[test]
fn sci_chiffres_exacts_largeur_fixe() {
    for base in [2u32, 8, 16] {
        for (entiers, fraction) in [(1, 0), (4, 2), (6, 3)] {
            let spec = FormatSpec::new(base, entiers, fraction).exacts(true);
            for x in VALEURS {
                let txt = fmt(x, &spec);
                let chiffres = txt.chars().filter(|c| c.is_ascii_alphanumeric()).count();
                assert_eq!(chiffres, entiers + fraction, "txt={txt:?} x={x}");
                assert!(!txt.starts_with('-'), "txt={txt:?}");

                // l’affichage masqué relit la valeur masquée
                let (m, _) = mask_value(x, base, entiers, fraction).unwrap();
                let lu = LecteurReponse::new(base, &Reglages::default())
                    .unwrap()
                    .lire_valeur(&txt);
                assert_eq!(lu, Some(m), "txt={txt:?}");
            }
        }
    }
}

/* ------------------------ Scénarios 22.375 ------------------------ */

#[test]
fn sci_scenarios_22_375() {
    let v = 22.375;
    assert_eq!(fmt(v, &FormatSpec::new(16, 1, 1)), "16.6");
    assert_eq!(fmt(v, &FormatSpec::new(16, 1, 1).avec_prefixe()), "0x16.6");
    assert_eq!(
        fmt(v, &FormatSpec::new(2, 4, 4).groupe(4).avec_prefixe()),
        "0b1_0110.0110"
    );
    assert_eq!(fmt(v, &FormatSpec::new(2, 4, 4).exacts(true)), "0110.0110");
}

#[test]
fn sci_separateurs_permutables() {
    let spec = FormatSpec::new(10, 1, 2).groupe(3);
    let point = VariableSubstituter::new([("x", 0.0)], Reglages::new(".", ",")).unwrap();
    let virgule = VariableSubstituter::new([("x", 0.0)], Reglages::new(",", ".")).unwrap();
    assert_eq!(point.format_in_base(12345.01, &spec).unwrap(), "12,345.01");
    assert_eq!(virgule.format_in_base(12345.01, &spec).unwrap(), "12.345,01");

    // séparateurs indépendants de la base et du groupement par 4
    let bin = FormatSpec::new(2, 4, 4).groupe(4);
    assert_eq!(virgule.format_in_base(22.375, &bin).unwrap(), "1_0110,0110");
}

/* ------------------------ Validation : arités ------------------------ */

const UN_ARGUMENT: [&str; 29] = [
    "abs", "acos", "acosh", "asin", "asinh", "atan", "atanh", "bindec", "ceil", "cos", "cosh",
    "decbin", "decoct", "deg2rad", "exp", "expm1", "floor", "is_finite", "is_infinite", "is_nan",
    "log10", "log1p", "octdec", "rad2deg", "sin", "sinh", "sqrt", "tan", "tanh",
];

fn appel(nom: &str, n: usize) -> String {
    let args: Vec<String> = (0..n).map(|i| format!("{{a}} + {i}")).collect();
    format!("{nom}({})", args.join(", "))
}

#[test]
fn sci_arites_liste_blanche() {
    let classes: Vec<(&str, Arite)> = UN_ARGUMENT
        .iter()
        .map(|n| (*n, Arite::Un))
        .chain([
            ("pi", Arite::Aucun),
            ("log", Arite::UnOuDeux),
            ("round", Arite::UnOuDeux),
            ("atan2", Arite::Deux),
            ("fmod", Arite::Deux),
            ("pow", Arite::Deux),
            ("min", Arite::AuMoinsDeux),
            ("max", Arite::AuMoinsDeux),
        ])
        .collect();

    for (nom, arite) in classes {
        for n in 0..5 {
            let f = appel(nom, n);
            let r = valider_formule(&f);
            if arite.accepte(n) {
                assert_eq!(r, Ok(()), "f={f:?}");
            } else {
                assert_eq!(
                    r,
                    Err(Erreur::AriteInvalide {
                        fonction: nom.into(),
                        arite
                    }),
                    "f={f:?}"
                );
            }
        }
    }

    for nom in ["system", "exec", "eval", "foo", "sind", "print"] {
        assert_eq!(
            valider_formule(&appel(nom, 1)),
            Err(Erreur::FonctionNonSupportee(nom.into()))
        );
    }

    // parenthèses nues : un seul argument
    assert!(find_formula_errors("({a})").is_none());
    assert!(find_formula_errors("()").is_some());
    assert!(find_formula_errors("({a}, 1)").is_some());
}

/* ------------------------ Calcul + texte ------------------------ */

#[test]
fn sci_calculs_de_reference() {
    let ab = |a: f64, b: f64| VariableSubstituter::new([("a", a), ("b", b)], Reglages::default()).unwrap();

    assert_eq!(ab(1.0, 2.0).calculate("{a} + {b}"), Ok(3.0));
    assert_eq!(ab(-1.0, -2.0).calculate("{a} - {b}"), Ok(1.0));
    assert!(matches!(
        ab(1.0, 2.0).calculate("{a}{b}"),
        Err(Erreur::SyntaxeIllegale(_))
    ));
    assert_eq!(
        ab(1.0, 2.0).replace_expressions_in_text("(1) {a}\n(2) {b}").unwrap(),
        "(1) 1\n(2) 2"
    );
}

#[test]
fn sci_non_finis_sans_erreur() {
    let vs = VariableSubstituter::new([("z", 0.0)], Reglages::default()).unwrap();
    assert_eq!(vs.calculate("1 / {z}"), Ok(f64::INFINITY));
    assert!(vs.calculate("{z} / {z}").unwrap().is_nan());
    assert_eq!(
        vs.replace_expressions_in_text("{=1/{z}} {%x=-1/{z}}").unwrap(),
        "inf -inf"
    );
}
