//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler l’analyse, le calcul et l’affichage sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - invariant clé : validation et calcul sont d’accord (jamais de panique)

use std::time::{Duration, Instant};

use super::config::Reglages;
use super::format::{format_in_base, FormatSpec};
use super::lecture::LecteurReponse;
use super::substitution::VariableSubstituter;
use super::validation::find_formula_errors;
use super::Erreur;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
    fn f64_signe(&mut self) -> f64 {
        let x = self.next_u32() as f64 / 1000.0;
        if self.coin() {
            -x
        } else {
            x
        }
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Génération de formules (bornée) ------------------------ */

const VARIABLES: [&str; 3] = ["a", "b", "c"];
const BINAIRES: [&str; 17] = [
    "+", "-", "*", "/", "%", "^", "==", "!=", "<", "<=", ">", ">=", "<<", ">>", "&", "|", "&&",
];
const UNAIRES: [&str; 4] = ["-", "+", "!", "~"];

fn substituer() -> VariableSubstituter {
    VariableSubstituter::new([("a", 1.5), ("b", -2.0), ("c", 0.0)], Reglages::default()).unwrap()
}

fn gen_atome(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 => format!("{}", rng.pick(100)),
        1 => format!("{}.{}", rng.pick(10), rng.pick(100)),
        2 => format!("0x{:X}", rng.pick(256)),
        3 => "pi()".to_string(),
        _ => format!("{{{}}}", VARIABLES[rng.pick(3) as usize]),
    }
}

fn gen_formule(rng: &mut Rng, profondeur: usize) -> String {
    if profondeur == 0 {
        return gen_atome(rng);
    }

    match rng.pick(8) {
        0 => gen_atome(rng),
        1 | 2 | 3 => format!(
            "({} {} {})",
            gen_formule(rng, profondeur - 1),
            BINAIRES[rng.pick(BINAIRES.len() as u32) as usize],
            gen_formule(rng, profondeur - 1)
        ),
        4 => format!(
            "{}{}",
            UNAIRES[rng.pick(4) as usize],
            gen_formule(rng, profondeur - 1)
        ),
        5 => format!(
            "{} ? {} : {}",
            gen_formule(rng, profondeur - 1),
            gen_formule(rng, profondeur - 1),
            gen_formule(rng, profondeur - 1)
        ),
        6 => {
            let f = ["sqrt", "abs", "sin", "floor", "exp", "log10"][rng.pick(6) as usize];
            format!("{f}({})", gen_formule(rng, profondeur - 1))
        }
        _ => {
            let f = ["pow", "max", "min", "atan2", "fmod"][rng.pick(5) as usize];
            format!(
                "{f}({}, {})",
                gen_formule(rng, profondeur - 1),
                gen_formule(rng, profondeur - 1)
            )
        }
    }
}

/// Altère une formule : insertion, suppression ou remplacement d’un caractère.
fn corrompre(rng: &mut Rng, f: &str) -> String {
    const SOUPE: &[char] = &['(', ')', '{', '}', ',', '=', ';', '$', 'x', '?', ':', '"', '9', ' '];
    let mut chars: Vec<char> = f.chars().collect();
    let i = rng.pick(chars.len() as u32 + 1) as usize;
    let c = SOUPE[rng.pick(SOUPE.len() as u32) as usize];
    match rng.pick(3) {
        0 => chars.insert(i, c),
        1 if i < chars.len() => {
            chars.remove(i);
        }
        _ if i < chars.len() => chars[i] = c,
        _ => chars.push(c),
    }
    chars.into_iter().collect()
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_formules_valides_toujours_calculables() {
    let t0 = Instant::now();
    let max = Duration::from_millis(300);

    let vs = substituer();
    let mut rng = Rng::new(0xC0FFEE_u64);
    let mut non_finis = 0usize;

    for _ in 0..200 {
        budget(t0, max);

        let f = gen_formule(&mut rng, 5);
        assert_eq!(find_formula_errors(&f), None, "formule générée refusée: {f:?}");

        // toutes les variables sont liées : le calcul ne peut pas échouer
        let v = vs
            .calculate(&f)
            .unwrap_or_else(|e| panic!("calcul refusé: f={f:?} err={e}"));
        if !v.is_finite() {
            non_finis += 1;
        }
    }

    // division par {c} = 0, sqrt de négatifs… le fuzz doit en voir passer
    assert!(non_finis > 0, "aucun non-fini vu: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_validation_et_calcul_d_accord() {
    let t0 = Instant::now();
    let max = Duration::from_millis(300);

    let vs = substituer();
    let mut rng = Rng::new(0xBADC0DE_u64);
    let mut refusees = 0usize;

    for _ in 0..300 {
        budget(t0, max);

        let saine = gen_formule(&mut rng, 3);
        let f = corrompre(&mut rng, &saine);
        let verdict = find_formula_errors(&f);

        match vs.calculate(&f) {
            Ok(_) => assert_eq!(verdict, None, "f={f:?}"),
            // {x} (ou autre nom inventé) : syntaxe valide, variable inconnue
            Err(Erreur::VariableInconnue(_)) => assert_eq!(verdict, None, "f={f:?}"),
            Err(e) => {
                assert!(e.est_erreur_de_formule(), "f={f:?} err={e}");
                assert_eq!(verdict, Some(e.to_string()), "f={f:?}");
                refusees += 1;
            }
        }
    }

    assert!(refusees > 30, "trop peu de refus: {refusees}");
}

#[test]
fn fuzz_safe_determinisme() {
    let vs = substituer();
    let run = |seed: u64| -> Vec<Result<u64, Erreur>> {
        let mut rng = Rng::new(seed);
        (0..60)
            .map(|_| {
                let f = gen_formule(&mut rng, 4);
                vs.calculate(&f).map(f64::to_bits)
            })
            .collect()
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn fuzz_safe_texte_libre() {
    let t0 = Instant::now();
    let max = Duration::from_millis(300);

    let vs = substituer();
    let mut rng = Rng::new(0x5EED_u64);

    for _ in 0..150 {
        budget(t0, max);

        let texte = format!(
            "x {} y {{={}}} z {{%p_8.2b={}}}",
            gen_atome(&mut rng),
            gen_formule(&mut rng, 2),
            gen_formule(&mut rng, 2)
        );
        match vs.replace_expressions_in_text(&texte) {
            Ok(out) => {
                assert!(!out.contains("{="), "span non remplacé: {texte:?} -> {out:?}");
                assert!(!out.contains("{a}") && !out.contains("{b}"), "out={out:?}");
            }
            Err(e) => panic!("texte={texte:?} err={e}"),
        }
    }
}

#[test]
fn fuzz_safe_affichage_relecture() {
    let t0 = Instant::now();
    let max = Duration::from_millis(300);

    let mut rng = Rng::new(0xF0F0_u64);
    let reglages = Reglages::default();

    for _ in 0..400 {
        budget(t0, max);

        let base = [2, 8, 10, 16, 3, 36][rng.pick(6) as usize];
        let entiers = rng.pick(10) as usize;
        let fraction = rng.pick(6) as usize;
        let mut spec = FormatSpec::new(base, entiers, fraction)
            .groupe([0, 3, 4][rng.pick(3) as usize])
            .exacts(rng.coin());
        spec.prefixe = rng.coin();

        let x = rng.f64_signe();
        let txt = format_in_base(x, &spec).unwrap_or_else(|e| panic!("x={x} err={e}"));

        let chiffres = txt.chars().filter(|c| c.is_ascii_alphanumeric()).count();
        assert!(chiffres >= entiers.max(1) + fraction, "txt={txt:?} spec={spec:?}");

        let lu = LecteurReponse::new(base, &reglages)
            .unwrap()
            .lire_valeur(&txt)
            .unwrap_or_else(|| panic!("relecture refusée: {txt:?} (base {base})"));
        if !(spec.chiffres_exacts && [2, 8, 16].contains(&base)) {
            let tol = 0.5 / (base as f64).powi(fraction as i32);
            assert!(
                (lu - x).abs() <= tol * (1.0 + 1e-9) + 1e-12 * x.abs(),
                "txt={txt:?} x={x} lu={lu}"
            );
        }
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    let expr = somme_balancee("{a}", 800);
    budget(t0, max);

    // 800 * 1.5 = 1200
    assert_eq!(substituer().calculate(&expr), Ok(1200.0));
}

#[test]
fn fuzz_safe_entrees_pathologiques() {
    let vs = substituer();
    for f in [
        "(".repeat(5000),
        ")".repeat(5000),
        "-".repeat(5000),
        "{".repeat(5000),
        format!("{}1", "2^".repeat(2000)),
        format!("{}1{}", "sqrt(".repeat(300), ")".repeat(300)),
    ] {
        assert!(find_formula_errors(&f).is_some(), "f={:?}…", &f[..20]);
        assert!(vs.calculate(&f).is_err());
        // le texte libre ne panique pas non plus
        let _ = vs.replace_expressions_in_text(&format!("{{={f}}}"));
    }
}
