// src/noyau/expr.rs
//
// AST des formules (flottants double précision à l’évaluation).
// - Nombre : littéral
// - Var    : référence {nom}, résolue seulement à l’évaluation
// - Appel  : fonction de la liste blanche, arité déjà vérifiée par l’analyse

use std::fmt;

use super::fonctions::Fonction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpUnaire {
    Neg,
    Plus,
    Non,    // !
    NonBit, // ~
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpBinaire {
    Add,
    Sub,
    Mul,
    Div,
    Reste,
    Puissance,

    Egal,
    Different,
    Inferieur,
    InferieurEgal,
    Superieur,
    SuperieurEgal,

    DecalageGauche,
    DecalageDroite,

    EtBit,
    OuBit,
    Et,
    Ou,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Nombre(f64),
    Var(String),

    Unaire(OpUnaire, Box<Expr>),
    Binaire(OpBinaire, Box<Expr>, Box<Expr>),

    // c ? a : b
    Condition(Box<Expr>, Box<Expr>, Box<Expr>),

    Appel(Fonction, Vec<Expr>),
}

impl Expr {
    /// Noms des variables référencées (ordre de première apparition, sans doublon).
    /// Itératif : pas de récursion sur des arbres profonds.
    pub fn variables(&self) -> Vec<&str> {
        use Expr::*;

        let mut vus: Vec<&str> = Vec::new();
        let mut pile: Vec<&Expr> = Vec::with_capacity(16);
        pile.push(self);

        while let Some(e) = pile.pop() {
            match e {
                Nombre(_) => {}
                Var(nom) => {
                    if !vus.contains(&nom.as_str()) {
                        vus.push(nom);
                    }
                }
                Unaire(_, x) => pile.push(x),
                Binaire(_, a, b) => {
                    pile.push(b);
                    pile.push(a);
                }
                Condition(c, a, b) => {
                    pile.push(b);
                    pile.push(a);
                    pile.push(c);
                }
                Appel(_, args) => pile.extend(args.iter().rev()),
            }
        }

        vus
    }
}

impl fmt::Display for OpUnaire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpUnaire::Neg => "-",
            OpUnaire::Plus => "+",
            OpUnaire::Non => "!",
            OpUnaire::NonBit => "~",
        })
    }
}

impl fmt::Display for OpBinaire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use OpBinaire::*;
        f.write_str(match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Reste => "%",
            Puissance => "^",
            Egal => "==",
            Different => "!=",
            Inferieur => "<",
            InferieurEgal => "<=",
            Superieur => ">",
            SuperieurEgal => ">=",
            DecalageGauche => "<<",
            DecalageDroite => ">>",
            EtBit => "&",
            OuBit => "|",
            Et => "&&",
            Ou => "||",
        })
    }
}

/* ------------------------ Affichage debug (parenthésé) ------------------------ */

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;
        match self {
            Nombre(v) => write!(f, "{v}"),
            Var(nom) => write!(f, "{{{nom}}}"),
            Unaire(op, x) => write!(f, "{op}({x})"),
            Binaire(op, a, b) => write!(f, "({a}{op}{b})"),
            Condition(c, a, b) => write!(f, "({c}?{a}:{b})"),
            Appel(fonction, args) => {
                write!(f, "{}(", fonction.nom())?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{a}")?;
                }
                f.write_str(")")
            }
        }
    }
}
