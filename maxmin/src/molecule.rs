//! Minimal SMILES reader.
//!
//! Builds the heavy-atom graph the fingerprint needs and refuses the inputs a
//! cheminformatics toolkit would fail to sanitize (broken syntax, unknown
//! elements, hypervalent neutral atoms, aromatic atoms outside rings).
//! Stereo markers are accepted and dropped, no kekulization is attempted.

use std::collections::BTreeMap;

pub const ELEMENTS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

pub fn atomic_number(symbol: &str) -> Option<u8> {
    ELEMENTS.iter().position(|s| *s == symbol).map(|p| (p + 1) as u8)
}

/// Valences an uncharged organic-subset atom may take, lowest first.
fn default_valences(atomic_number: u8) -> &'static [u8] {
    match atomic_number {
        5 => &[3],
        6 => &[4],
        7 | 15 => &[3, 5],
        8 => &[2],
        16 => &[2, 4, 6],
        9 | 17 | 35 | 53 => &[1],
        _ => &[],
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SmilesError {
    #[error("empty SMILES")]
    Empty,
    #[error("unexpected character {ch:?} at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unknown element {symbol:?} at position {pos}")]
    UnknownElement { symbol: String, pos: usize },
    #[error("malformed bracket atom at position {pos}")]
    MalformedBracketAtom { pos: usize },
    #[error("unclosed branch")]
    UnclosedBranch,
    #[error("unmatched ')' at position {pos}")]
    UnmatchedBranchClose { pos: usize },
    #[error("bond at position {pos} is not followed by an atom")]
    BondWithoutAtom { pos: usize },
    #[error("ring bond {0} is never closed")]
    UnclosedRing(u16),
    #[error("ring bond {0} has conflicting bond orders")]
    RingBondConflict(u16),
    #[error("ring bond {0} closes on its own atom")]
    RingClosureToSelf(u16),
    #[error("duplicate bond at position {pos}")]
    DuplicateBond { pos: usize },
    #[error("atom {atom} is aromatic but not in a ring")]
    AromaticOutsideRing { atom: usize },
    #[error("explicit valence {valence} of atom {atom} is greater than permitted")]
    ValenceExceeded { atom: usize, valence: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}

impl BondOrder {

    fn from_symbol(c: u8) -> Option<Self> {
        match c {
            b'-' | b'/' | b'\\' => Some(BondOrder::Single),
            b'=' => Some(BondOrder::Double),
            b'#' => Some(BondOrder::Triple),
            b'$' => Some(BondOrder::Quadruple),
            b':' => Some(BondOrder::Aromatic),
            _ => None,
        }
    }

    /// Bond order in units of half a bond, so an aromatic bond counts 1.5.
    pub fn half_units(self) -> u8 {
        match self {
            BondOrder::Single => 2,
            BondOrder::Double => 4,
            BondOrder::Triple => 6,
            BondOrder::Quadruple => 8,
            BondOrder::Aromatic => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// 0 for the `*` wildcard.
    pub atomic_number: u8,
    pub aromatic: bool,
    pub isotope: Option<u16>,
    pub charge: i8,
    /// Hydrogens written inside a bracket atom. `None` for organic-subset atoms.
    pub explicit_hydrogens: Option<u8>,
    pub implicit_hydrogens: u8,
    pub in_ring: bool,
}

impl Atom {

    fn new(atomic_number: u8, aromatic: bool) -> Self {
        Self {
            atomic_number,
            aromatic,
            isotope: None,
            charge: 0,
            explicit_hydrogens: None,
            implicit_hydrogens: 0,
            in_ring: false,
        }
    }

    pub fn total_hydrogens(&self) -> u8 {
        self.explicit_hydrogens.unwrap_or(0) + self.implicit_hydrogens
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub atom: usize,
    pub bond: usize,
}

/// Heavy-atom graph of one parsed structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    neighbors: Vec<Vec<Neighbor>>,
}

impl Molecule {

    pub fn from_smiles(smiles: &str) -> Result<Self, SmilesError> {

        let (atoms, bonds) = SmilesParser::new(smiles).parse()?;

        let mut neighbors = vec![Vec::new(); atoms.len()];
        for (i, bond) in bonds.iter().enumerate() {
            neighbors[bond.begin].push(Neighbor { atom: bond.end, bond: i });
            neighbors[bond.end].push(Neighbor { atom: bond.begin, bond: i });
        }

        let mut molecule = Self { atoms, bonds, neighbors };
        molecule.perceive_rings();
        molecule.assign_hydrogens()?;

        return Ok(molecule);
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn neighbors(&self, atom: usize) -> &[Neighbor] {
        &self.neighbors[atom]
    }

    pub fn degree(&self, atom: usize) -> usize {
        self.neighbors[atom].len()
    }

    /// An atom is in a ring iff it touches a bond that is not a bridge.
    fn perceive_rings(&mut self) {

        let mut search = BridgeSearch {
            neighbors: &self.neighbors,
            discovered: vec![usize::MAX; self.atoms.len()],
            low: vec![0; self.atoms.len()],
            timer: 0,
            bridges: vec![false; self.bonds.len()],
        };

        for atom in 0..self.atoms.len() {
            if search.discovered[atom] == usize::MAX {
                search.visit(atom);
            }
        }

        let bridges = search.bridges;
        for (i, bond) in self.bonds.iter().enumerate() {
            if !bridges[i] {
                self.atoms[bond.begin].in_ring = true;
                self.atoms[bond.end].in_ring = true;
            }
        }
    }

    fn assign_hydrogens(&mut self) -> Result<(), SmilesError> {

        for i in 0..self.atoms.len() {

            let half_units: u32 = self.neighbors[i]
                .iter()
                .map(|n| self.bonds[n.bond].order.half_units() as u32)
                .sum();
            let used = ((half_units + 1) / 2) as u8;

            let atom = &mut self.atoms[i];

            if atom.aromatic && !atom.in_ring {
                return Err(SmilesError::AromaticOutsideRing { atom: i });
            }

            let valences = default_valences(atom.atomic_number);
            let max_valence = valences.last().copied();

            match atom.explicit_hydrogens {
                Some(hydrogens) => {
                    let valence = used.saturating_add(hydrogens);
                    if let Some(max) = max_valence {
                        if atom.charge == 0 && !atom.aromatic && valence > max {
                            return Err(SmilesError::ValenceExceeded { atom: i, valence });
                        }
                    }
                },
                None => {
                    if let Some(max) = max_valence {
                        if !atom.aromatic && used > max {
                            return Err(SmilesError::ValenceExceeded { atom: i, valence: used });
                        }
                    }
                    atom.implicit_hydrogens = valences
                        .iter()
                        .find(|v| **v >= used)
                        .map(|v| v - used)
                        .unwrap_or(0);
                },
            }
        }

        Ok(())
    }
}

struct BridgeSearch<'a> {
    neighbors: &'a [Vec<Neighbor>],
    discovered: Vec<usize>,
    low: Vec<usize>,
    timer: usize,
    bridges: Vec<bool>,
}

impl<'a> BridgeSearch<'a> {

    fn enter(&mut self, atom: usize) {
        self.discovered[atom] = self.timer;
        self.low[atom] = self.timer;
        self.timer += 1;
    }

    /// Depth-first walk from `root` with an explicit stack of
    /// `(atom, bond to parent, next neighbor)` frames.
    fn visit(&mut self, root: usize) {

        let neighbors = self.neighbors;
        let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];
        self.enter(root);

        while let Some(frame) = stack.last_mut() {

            let (atom, parent_bond, cursor) = *frame;

            match neighbors[atom].get(cursor) {
                Some(neighbor) => {
                    frame.2 += 1;

                    if Some(neighbor.bond) == parent_bond {
                        continue;
                    }

                    if self.discovered[neighbor.atom] == usize::MAX {
                        self.enter(neighbor.atom);
                        stack.push((neighbor.atom, Some(neighbor.bond), 0));
                    } else {
                        self.low[atom] = self.low[atom].min(self.discovered[neighbor.atom]);
                    }
                },
                None => {
                    stack.pop();

                    if let (Some(bond), Some(&(parent, _, _))) = (parent_bond, stack.last()) {
                        self.low[parent] = self.low[parent].min(self.low[atom]);
                        if self.low[atom] > self.discovered[parent] {
                            self.bridges[bond] = true;
                        }
                    }
                },
            }
        }
    }
}

struct SmilesParser<'a> {
    bytes: &'a [u8],
    pos: usize,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    /// Bonded partners of every atom so far.
    adjacent: Vec<Vec<usize>>,
}

impl<'a> SmilesParser<'a> {

    fn new(smiles: &'a str) -> Self {
        Self {
            bytes: smiles.as_bytes(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            adjacent: Vec::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn unexpected(&self) -> SmilesError {
        SmilesError::UnexpectedChar { ch: self.bytes[self.pos] as char, pos: self.pos }
    }

    fn parse(mut self) -> Result<(Vec<Atom>, Vec<Bond>), SmilesError> {

        if self.bytes.is_empty() {
            return Err(SmilesError::Empty);
        }

        let mut prev: Option<usize> = None;
        let mut branches: Vec<usize> = Vec::new();
        let mut pending_bond: Option<(BondOrder, usize)> = None;
        let mut open_rings: BTreeMap<u16, (usize, Option<BondOrder>)> = BTreeMap::new();

        while let Some(c) = self.peek() {

            match c {
                b'(' => {
                    let atom = match prev {
                        Some(atom) if pending_bond.is_none() => atom,
                        _ => return Err(self.unexpected()),
                    };
                    branches.push(atom);
                    self.pos += 1;
                },
                b')' => {
                    if let Some((_, pos)) = pending_bond {
                        return Err(SmilesError::BondWithoutAtom { pos });
                    }
                    match branches.pop() {
                        Some(atom) => prev = Some(atom),
                        None => return Err(SmilesError::UnmatchedBranchClose { pos: self.pos }),
                    }
                    self.pos += 1;
                },
                b'.' => {
                    if let Some((_, pos)) = pending_bond {
                        return Err(SmilesError::BondWithoutAtom { pos });
                    }
                    if prev.is_none() || !branches.is_empty() {
                        return Err(self.unexpected());
                    }
                    prev = None;
                    self.pos += 1;
                },
                b'0'..=b'9' | b'%' => {
                    let atom = match prev {
                        Some(atom) => atom,
                        None => return Err(self.unexpected()),
                    };
                    let start = self.pos;
                    let number = self.ring_number()?;
                    let written = pending_bond.take().map(|(order, _)| order);

                    match open_rings.remove(&number) {
                        None => {
                            open_rings.insert(number, (atom, written));
                        },
                        Some((opening, opened_with)) => {
                            if opening == atom {
                                return Err(SmilesError::RingClosureToSelf(number));
                            }
                            let order = match (opened_with, written) {
                                (Some(a), Some(b)) if a != b => {
                                    return Err(SmilesError::RingBondConflict(number));
                                },
                                (Some(a), _) | (None, Some(a)) => a,
                                (None, None) => self.implied_order(opening, atom),
                            };
                            self.add_bond(opening, atom, order, start)?;
                        },
                    }
                },
                _ => {
                    if let Some(order) = BondOrder::from_symbol(c) {
                        if prev.is_none() || pending_bond.is_some() {
                            return Err(self.unexpected());
                        }
                        pending_bond = Some((order, self.pos));
                        self.pos += 1;
                        continue;
                    }

                    let start = self.pos;
                    let atom = match c {
                        b'[' => self.bracket_atom()?,
                        _ => self.organic_atom()?,
                    };
                    self.atoms.push(atom);
                    self.adjacent.push(Vec::new());
                    let index = self.atoms.len() - 1;

                    if let Some(p) = prev {
                        let order = match pending_bond.take() {
                            Some((order, _)) => order,
                            None => self.implied_order(p, index),
                        };
                        self.add_bond(p, index, order, start)?;
                    }
                    prev = Some(index);
                },
            }
        }

        if let Some((_, pos)) = pending_bond {
            return Err(SmilesError::BondWithoutAtom { pos });
        }
        if !branches.is_empty() {
            return Err(SmilesError::UnclosedBranch);
        }
        if let Some(number) = open_rings.keys().next() {
            return Err(SmilesError::UnclosedRing(*number));
        }

        Ok((self.atoms, self.bonds))
    }

    fn implied_order(&self, a: usize, b: usize) -> BondOrder {
        match self.atoms[a].aromatic && self.atoms[b].aromatic {
            true => BondOrder::Aromatic,
            false => BondOrder::Single,
        }
    }

    fn add_bond(&mut self, begin: usize, end: usize, order: BondOrder, pos: usize) -> Result<(), SmilesError> {

        if self.adjacent[begin].contains(&end) {
            return Err(SmilesError::DuplicateBond { pos });
        }

        self.adjacent[begin].push(end);
        self.adjacent[end].push(begin);
        self.bonds.push(Bond { begin, end, order });
        Ok(())
    }

    fn ring_number(&mut self) -> Result<u16, SmilesError> {

        match self.peek() {
            Some(b'%') => {
                match (self.peek_at(1), self.peek_at(2)) {
                    (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit() => {
                        self.pos += 3;
                        Ok(((a - b'0') as u16) * 10 + (b - b'0') as u16)
                    },
                    _ => Err(self.unexpected()),
                }
            },
            Some(d) => {
                self.pos += 1;
                Ok((d - b'0') as u16)
            },
            None => Err(SmilesError::Empty),
        }
    }

    fn organic_atom(&mut self) -> Result<Atom, SmilesError> {

        let c = self.bytes[self.pos];
        let next = self.peek_at(1);

        let (atomic_number, aromatic, width) = match (c, next) {
            (b'C', Some(b'l')) => (17, false, 2),
            (b'B', Some(b'r')) => (35, false, 2),
            (b'*', _) => (0, false, 1),
            (b'B', _) => (5, false, 1),
            (b'C', _) => (6, false, 1),
            (b'N', _) => (7, false, 1),
            (b'O', _) => (8, false, 1),
            (b'P', _) => (15, false, 1),
            (b'S', _) => (16, false, 1),
            (b'F', _) => (9, false, 1),
            (b'I', _) => (53, false, 1),
            (b'b', _) => (5, true, 1),
            (b'c', _) => (6, true, 1),
            (b'n', _) => (7, true, 1),
            (b'o', _) => (8, true, 1),
            (b'p', _) => (15, true, 1),
            (b's', _) => (16, true, 1),
            _ => return Err(self.unexpected()),
        };

        self.pos += width;
        Ok(Atom::new(atomic_number, aromatic))
    }

    fn number(&mut self) -> Option<u32> {

        let start = self.pos;
        while matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
            self.pos += 1;
        }

        match self.pos > start {
            true => std::str::from_utf8(&self.bytes[start..self.pos]).ok()?.parse().ok(),
            false => None,
        }
    }

    fn bracket_atom(&mut self) -> Result<Atom, SmilesError> {

        let open = self.pos;
        let malformed = SmilesError::MalformedBracketAtom { pos: open };
        self.pos += 1;

        let isotope = match self.number() {
            Some(n) => Some(u16::try_from(n).map_err(|_| malformed.clone())?),
            None => None,
        };

        let mut atom = self.bracket_symbol(open)?;
        atom.isotope = isotope;

        if self.peek() == Some(b'@') {
            self.pos += 1;
            if self.peek() == Some(b'@') {
                self.pos += 1;
            } else if matches!(self.bytes.get(self.pos..self.pos + 2), Some(b"TH" | b"AL" | b"SP" | b"TB" | b"OH")) {
                self.pos += 2;
                self.number().ok_or_else(|| malformed.clone())?;
            }
        }

        atom.explicit_hydrogens = Some(0);
        if self.peek() == Some(b'H') {
            self.pos += 1;
            let count = self.number().unwrap_or(1);
            atom.explicit_hydrogens = Some(u8::try_from(count).map_err(|_| malformed.clone())?);
        }

        if let Some(sign @ (b'+' | b'-')) = self.peek() {
            self.pos += 1;
            let magnitude = match self.number() {
                Some(n) => n,
                None => {
                    let mut n = 1;
                    while self.peek() == Some(sign) {
                        self.pos += 1;
                        n += 1;
                    }
                    n
                },
            };
            let magnitude = i8::try_from(magnitude).map_err(|_| malformed.clone())?;
            atom.charge = match sign {
                b'+' => magnitude,
                _ => -magnitude,
            };
        }

        if self.peek() == Some(b':') {
            self.pos += 1;
            self.number().ok_or_else(|| malformed.clone())?;
        }

        match self.peek() {
            Some(b']') => {
                self.pos += 1;
                Ok(atom)
            },
            _ => Err(malformed),
        }
    }

    fn bracket_symbol(&mut self, open: usize) -> Result<Atom, SmilesError> {

        let first = match self.peek() {
            Some(c) => c,
            None => return Err(SmilesError::MalformedBracketAtom { pos: open }),
        };
        let second = self.peek_at(1);

        if first == b'*' {
            self.pos += 1;
            return Ok(Atom::new(0, false));
        }

        if first.is_ascii_lowercase() {
            let two = self.bytes.get(self.pos..self.pos + 2);
            let (atomic_number, width) = match (two, first) {
                (Some(b"se"), _) => (34, 2),
                (Some(b"as"), _) => (33, 2),
                (Some(b"te"), _) => (52, 2),
                (_, b'b') => (5, 1),
                (_, b'c') => (6, 1),
                (_, b'n') => (7, 1),
                (_, b'o') => (8, 1),
                (_, b'p') => (15, 1),
                (_, b's') => (16, 1),
                _ => {
                    return Err(SmilesError::UnknownElement {
                        symbol: (first as char).to_string(),
                        pos: self.pos,
                    })
                },
            };
            self.pos += width;
            return Ok(Atom::new(atomic_number, true));
        }

        if !first.is_ascii_uppercase() {
            return Err(SmilesError::MalformedBracketAtom { pos: open });
        }

        if let Some(s) = second.filter(|s| s.is_ascii_lowercase()) {
            let symbol = format!("{}{}", first as char, s as char);
            if let Some(n) = atomic_number(&symbol) {
                self.pos += 2;
                return Ok(Atom::new(n, false));
            }
        }

        let symbol = (first as char).to_string();
        match atomic_number(&symbol) {
            Some(n) => {
                self.pos += 1;
                Ok(Atom::new(n, false))
            },
            None => Err(SmilesError::UnknownElement { symbol, pos: self.pos }),
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn element_table_is_ordered() {
        assert_eq!(atomic_number("H"), Some(1));
        assert_eq!(atomic_number("C"), Some(6));
        assert_eq!(atomic_number("Cl"), Some(17));
        assert_eq!(atomic_number("Br"), Some(35));
        assert_eq!(atomic_number("I"), Some(53));
        assert_eq!(atomic_number("Og"), Some(118));
        assert_eq!(atomic_number("Xx"), None);
    }

    #[test]
    fn parse_benzoic_acid() {

        let mol = Molecule::from_smiles("C1=CC=C(C=C1)C(=O)O").unwrap();

        assert_eq!(mol.num_atoms(), 9);
        assert_eq!(mol.bonds().len(), 9);

        let ring_atoms = mol.atoms().iter().filter(|a| a.in_ring).count();
        assert_eq!(ring_atoms, 6);

        // carboxyl carbon: one single bond to the ring, double to O, single to OH
        assert_eq!(mol.degree(6), 3);
        assert_eq!(mol.atoms()[6].total_hydrogens(), 0);
        assert_eq!(mol.atoms()[8].total_hydrogens(), 1);
    }

    #[test]
    fn aromatic_ring_hydrogens() {

        let mol = Molecule::from_smiles("c1ccncc1").unwrap();

        assert_eq!(mol.num_atoms(), 6);
        assert!(mol.bonds().iter().all(|b| b.order == BondOrder::Aromatic));
        assert_eq!(mol.atoms()[0].total_hydrogens(), 1);
        assert_eq!(mol.atoms()[3].atomic_number, 7);
        assert_eq!(mol.atoms()[3].total_hydrogens(), 0);
    }

    #[test]
    fn implicit_hydrogens_follow_valence() {

        let mol = Molecule::from_smiles("CC=O").unwrap();
        let hydrogens: Vec<u8> = mol.atoms().iter().map(|a| a.total_hydrogens()).collect();
        assert_eq!(hydrogens, vec![3, 1, 0]);

        let mol = Molecule::from_smiles("CS(=O)(=O)C").unwrap();
        assert_eq!(mol.atoms()[1].total_hydrogens(), 0);
    }

    #[test]
    fn bracket_atoms() {

        let mol = Molecule::from_smiles("[13CH3][C@@H](N)C(=O)[O-].[Na+]").unwrap();

        let atoms = mol.atoms();
        assert_eq!(atoms[0].isotope, Some(13));
        assert_eq!(atoms[0].total_hydrogens(), 3);
        assert_eq!(atoms[1].total_hydrogens(), 1);
        assert_eq!(atoms[5].charge, -1);
        assert_eq!(atoms[6].atomic_number, 11);
        assert_eq!(atoms[6].charge, 1);

        let mol = Molecule::from_smiles("[Fe++]").unwrap();
        assert_eq!(mol.atoms()[0].charge, 2);

        let mol = Molecule::from_smiles("c1cc[nH]c1").unwrap();
        assert_eq!(mol.atoms()[3].total_hydrogens(), 1);
    }

    #[test]
    fn ring_membership_excludes_substituents() {

        let mol = Molecule::from_smiles("CC1CC1").unwrap();
        let in_ring: Vec<bool> = mol.atoms().iter().map(|a| a.in_ring).collect();
        assert_eq!(in_ring, vec![false, true, true, true]);

        let mol = Molecule::from_smiles("C1CC1C1CC1").unwrap();
        assert!(mol.atoms().iter().all(|a| a.in_ring));
    }

    #[test]
    fn two_digit_ring_closures() {

        let mol = Molecule::from_smiles("C%10CCCC%10").unwrap();
        assert_eq!(mol.bonds().len(), 5);
        assert!(mol.atoms().iter().all(|a| a.in_ring));
    }

    #[test]
    fn rejects_malformed() {

        assert_eq!(Molecule::from_smiles(""), Err(SmilesError::Empty));
        assert_eq!(Molecule::from_smiles("C1CC"), Err(SmilesError::UnclosedRing(1)));
        assert_eq!(Molecule::from_smiles("C(C"), Err(SmilesError::UnclosedBranch));
        assert_eq!(Molecule::from_smiles("C)C"), Err(SmilesError::UnmatchedBranchClose { pos: 1 }));
        assert_eq!(Molecule::from_smiles("CC="), Err(SmilesError::BondWithoutAtom { pos: 2 }));
        assert_eq!(Molecule::from_smiles("C=1CC#1"), Err(SmilesError::RingBondConflict(1)));
        assert_eq!(Molecule::from_smiles("C11"), Err(SmilesError::RingClosureToSelf(1)));
        assert_eq!(Molecule::from_smiles("C1C1"), Err(SmilesError::DuplicateBond { pos: 3 }));
        assert_eq!(Molecule::from_smiles("=C"), Err(SmilesError::UnexpectedChar { ch: '=', pos: 0 }));
        assert_eq!(Molecule::from_smiles("CXC"), Err(SmilesError::UnexpectedChar { ch: 'X', pos: 1 }));
        assert!(matches!(Molecule::from_smiles("[Xx]"), Err(SmilesError::UnknownElement { .. })));
        assert!(matches!(Molecule::from_smiles("[C"), Err(SmilesError::MalformedBracketAtom { pos: 0 })));
        assert!(matches!(Molecule::from_smiles("C C"), Err(SmilesError::UnexpectedChar { ch: ' ', pos: 1 })));
    }

    #[test]
    fn rejects_unsanitizable() {

        assert_eq!(Molecule::from_smiles("CC(C)(C)(C)C"), Err(SmilesError::ValenceExceeded { atom: 1, valence: 5 }));
        assert_eq!(Molecule::from_smiles("[CH5]"), Err(SmilesError::ValenceExceeded { atom: 0, valence: 5 }));
        assert_eq!(Molecule::from_smiles("Ccc"), Err(SmilesError::AromaticOutsideRing { atom: 1 }));

        // charged atoms are not held to the neutral valence table
        assert!(Molecule::from_smiles("C[N+](C)(C)C").is_ok());
        assert!(Molecule::from_smiles("[NH4+]").is_ok());
    }

    #[test]
    fn very_long_chains_and_rings() {

        let chain = Molecule::from_smiles(&"C".repeat(300_000)).unwrap();
        assert_eq!(chain.num_atoms(), 300_000);
        assert_eq!(chain.bonds().len(), 299_999);
        assert!(chain.atoms().iter().all(|a| !a.in_ring));
        assert_eq!(chain.atoms()[0].implicit_hydrogens, 3);
        assert_eq!(chain.atoms()[150_000].implicit_hydrogens, 2);

        let ring = Molecule::from_smiles(&format!("C1{}C1", "C".repeat(200_000))).unwrap();
        assert_eq!(ring.num_atoms(), 200_002);
        assert!(ring.atoms().iter().all(|a| a.in_ring));

        let tail = Molecule::from_smiles(&format!("C1CC1{}", "C".repeat(100_000))).unwrap();
        assert!(tail.atoms()[..3].iter().all(|a| a.in_ring));
        assert!(tail.atoms()[3..].iter().all(|a| !a.in_ring));
    }
}
