// src/runcard/process.rs

//! POWHEG-BOX process families.
//!
//! Each variant carries the parameters only that process understands. The
//! defaults for a family (grid sizes, folding, Born suppression, which
//! optional key groups apply) come from the named factory functions at the
//! bottom of this file.

use crate::runcard::{
    BornSuppression, CardEntry, Folding, GridSettings, ParameterGroups, ScaleParameters,
};
use crate::types::ProcessKind;

#[derive(Debug, Clone, PartialEq)]
pub struct HeavyQuark {
    pub qmass: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopPair {
    pub qmass: f64,
    /// Five digits counting W decays into (e, mu, tau, u, c); `0` disables decays.
    pub topdecaymode: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Higgs {
    pub hmass: f64,
    pub hwidth: f64,
    /// `-1` keeps the Higgs undecayed.
    pub hdecaymode: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WBoson {
    /// `24` for W+, `-24` for W-.
    pub idvecbos: i64,
    pub vdecaymode: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZBoson {
    pub vdecaymode: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diboson {
    pub vdecaymode1: i64,
    pub vdecaymode2: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessVariant {
    Bb(HeavyQuark),
    Dijet,
    Ggh(Higgs),
    Vbfh(Higgs),
    W(WBoson),
    Z(ZBoson),
    Ww(Diboson),
    Wz(Diboson),
    Zz(Diboson),
    Tt(TopPair),
}

impl ProcessVariant {
    pub fn kind(&self) -> ProcessKind {
        match self {
            ProcessVariant::Bb(_) => ProcessKind::Bb,
            ProcessVariant::Dijet => ProcessKind::Dijet,
            ProcessVariant::Ggh(_) => ProcessKind::Ggh,
            ProcessVariant::Vbfh(_) => ProcessKind::Vbfh,
            ProcessVariant::W(_) => ProcessKind::W,
            ProcessVariant::Z(_) => ProcessKind::Z,
            ProcessVariant::Ww(_) => ProcessKind::Ww,
            ProcessVariant::Wz(_) => ProcessKind::Wz,
            ProcessVariant::Zz(_) => ProcessKind::Zz,
            ProcessVariant::Tt(_) => ProcessKind::Tt,
        }
    }

    /// Path of `pwhg_main` relative to `$POWHEGPATH`.
    pub fn executable_suffix(&self) -> &'static str {
        match self {
            ProcessVariant::Bb(_) | ProcessVariant::Tt(_) => "POWHEG-BOX/hvq/pwhg_main",
            ProcessVariant::Dijet => "POWHEG-BOX/Dijet/pwhg_main",
            ProcessVariant::Ggh(_) => "POWHEG-BOX/gg_H_quark-mass-effects/pwhg_main",
            ProcessVariant::Vbfh(_) => "POWHEG-BOX/VBF_H/pwhg_main",
            ProcessVariant::W(_) => "POWHEG-BOX/W/pwhg_main",
            ProcessVariant::Z(_) => "POWHEG-BOX/Z/pwhg_main",
            ProcessVariant::Ww(_) => "POWHEG-BOX/WW/pwhg_main",
            ProcessVariant::Wz(_) => "POWHEG-BOX/WZ/pwhg_main",
            ProcessVariant::Zz(_) => "POWHEG-BOX/ZZ/pwhg_main",
        }
    }

    /// Keys understood only by this process family, in card order.
    pub fn entries(&self) -> Vec<CardEntry> {
        match self {
            ProcessVariant::Bb(hq) => vec![CardEntry::new(
                "qmass",
                hq.qmass,
                "mass of heavy quark in GeV",
            )],
            ProcessVariant::Tt(tt) => vec![
                CardEntry::new("qmass", tt.qmass, "mass of heavy quark in GeV"),
                CardEntry::new("topdecaymode", tt.topdecaymode, "top decay mode (0 = no decay)"),
            ],
            ProcessVariant::Dijet => Vec::new(),
            ProcessVariant::Ggh(h) | ProcessVariant::Vbfh(h) => vec![
                CardEntry::new("hmass", h.hmass, "Higgs boson mass"),
                CardEntry::new("hwidth", h.hwidth, "Higgs boson width"),
                CardEntry::new(
                    "hdecaymode",
                    h.hdecaymode,
                    "-1 no decay, 0 all, 1-6 quarks, 7-9 leptons, 10 WW, 11 ZZ, 12 gamma gamma",
                ),
            ],
            ProcessVariant::W(w) => vec![
                CardEntry::new("idvecbos", w.idvecbos, "PDG code for vector boson (24 W+, -24 W-)"),
                CardEntry::new("vdecaymode", w.vdecaymode, "1 e, 2 mu, 3 tau"),
            ],
            ProcessVariant::Z(z) => vec![CardEntry::new(
                "vdecaymode",
                z.vdecaymode,
                "1 e, 2 mu, 3 tau, 4 nu",
            )],
            ProcessVariant::Ww(d) => vec![
                CardEntry::new("vdecaymodeW1", d.vdecaymode1, "decay mode of first W"),
                CardEntry::new("vdecaymodeW2", d.vdecaymode2, "decay mode of second W"),
            ],
            ProcessVariant::Wz(d) => vec![
                CardEntry::new("vdecaymodeW", d.vdecaymode1, "decay mode of the W"),
                CardEntry::new("vdecaymodeZ", d.vdecaymode2, "decay mode of the Z"),
            ],
            ProcessVariant::Zz(d) => vec![
                CardEntry::new("vdecaymodeZ1", d.vdecaymode1, "decay mode of first Z"),
                CardEntry::new("vdecaymodeZ2", d.vdecaymode2, "decay mode of second Z"),
            ],
        }
    }

    pub fn is_diboson(&self) -> bool {
        matches!(
            self,
            ProcessVariant::Ww(_) | ProcessVariant::Wz(_) | ProcessVariant::Zz(_)
        )
    }
}

/// Family defaults layered on top of the universal run-card defaults.
#[derive(Debug, Clone)]
pub struct VariantDefaults {
    pub process: ProcessVariant,
    pub groups: ParameterGroups,
    pub grid: GridSettings,
    pub folding: Folding,
    pub born: BornSuppression,
    pub scales: ScaleParameters,
}

impl VariantDefaults {
    fn base(process: ProcessVariant) -> Self {
        Self {
            process,
            groups: ParameterGroups::default(),
            grid: GridSettings::default(),
            folding: Folding::default(),
            born: BornSuppression::default(),
            scales: ScaleParameters::default(),
        }
    }
}

pub fn defaults_for(kind: ProcessKind) -> VariantDefaults {
    match kind {
        ProcessKind::Bb => bb(),
        ProcessKind::Dijet => dijet(),
        ProcessKind::Ggh => ggh(),
        ProcessKind::Vbfh => vbfh(),
        ProcessKind::W => w(),
        ProcessKind::Z => z(),
        ProcessKind::Ww => ww(),
        ProcessKind::Wz => wz(),
        ProcessKind::Zz => zz(),
        ProcessKind::Tt => tt(),
    }
}

pub fn bb() -> VariantDefaults {
    let mut d = VariantDefaults::base(ProcessVariant::Bb(HeavyQuark { qmass: 4.75 }));
    d.grid.ncall1 = 10000;
    d.grid.ncall2 = 100000;
    d.folding = Folding::new(5, 5, 1);
    d.born = BornSuppression {
        bornktmin: 5.0,
        bornsuppfact: 100.0,
    };
    d
}

pub fn dijet() -> VariantDefaults {
    let mut d = VariantDefaults::base(ProcessVariant::Dijet);
    d.grid.ncall1 = 20000;
    d.grid.itmx1 = 5;
    d.grid.ncall2 = 20000;
    d.grid.itmx2 = 5;
    d.folding = Folding::new(5, 5, 1);
    d.born = BornSuppression {
        bornktmin: 5.0,
        bornsuppfact: 800.0,
    };
    d
}

pub fn ggh() -> VariantDefaults {
    let mut d = VariantDefaults::base(ProcessVariant::Ggh(Higgs {
        hmass: 125.0,
        hwidth: 0.00407,
        hdecaymode: -1,
    }));
    d.grid.ncall1 = 50000;
    d.grid.ncall2 = 50000;
    d.groups.electroweak = true;
    d.groups.scales = true;
    d.scales.hfact = Some(104.16);
    d
}

pub fn vbfh() -> VariantDefaults {
    let mut d = VariantDefaults::base(ProcessVariant::Vbfh(Higgs {
        hmass: 125.0,
        hwidth: 0.00407,
        hdecaymode: -1,
    }));
    d.grid.ncall1 = 250000;
    d.grid.ncall2 = 250000;
    d.groups.electroweak = true;
    d
}

pub fn w() -> VariantDefaults {
    let mut d = VariantDefaults::base(ProcessVariant::W(WBoson {
        idvecbos: 24,
        vdecaymode: 1,
    }));
    d.groups.electroweak = true;
    d.groups.ckm = true;
    d
}

pub fn z() -> VariantDefaults {
    let mut d = VariantDefaults::base(ProcessVariant::Z(ZBoson { vdecaymode: 1 }));
    d.groups.electroweak = true;
    d
}

pub fn ww() -> VariantDefaults {
    let mut d = VariantDefaults::base(ProcessVariant::Ww(Diboson {
        vdecaymode1: 1,
        vdecaymode2: 1,
    }));
    d.grid.ncall1 = 40000;
    d.grid.ncall2 = 40000;
    d.folding = Folding::new(2, 2, 1);
    d.groups.electroweak = true;
    d.groups.ckm = true;
    d.groups.diboson = true;
    d
}

pub fn wz() -> VariantDefaults {
    let mut d = VariantDefaults::base(ProcessVariant::Wz(Diboson {
        vdecaymode1: 1,
        vdecaymode2: 1,
    }));
    d.grid.ncall1 = 40000;
    d.grid.ncall2 = 40000;
    d.folding = Folding::new(2, 2, 1);
    d.groups.electroweak = true;
    d.groups.ckm = true;
    d.groups.diboson = true;
    d
}

pub fn zz() -> VariantDefaults {
    let mut d = VariantDefaults::base(ProcessVariant::Zz(Diboson {
        vdecaymode1: 1,
        vdecaymode2: 1,
    }));
    d.grid.ncall1 = 40000;
    d.grid.ncall2 = 40000;
    d.groups.electroweak = true;
    d.groups.diboson = true;
    d
}

pub fn tt() -> VariantDefaults {
    let mut d = VariantDefaults::base(ProcessVariant::Tt(TopPair {
        qmass: 172.5,
        topdecaymode: 22222,
    }));
    d.grid.ncall1 = 10000;
    d.grid.ncall2 = 100000;
    d.folding = Folding::new(1, 1, 1);
    d.groups.scales = true;
    d.scales.hdamp = 172.5;
    d
}
