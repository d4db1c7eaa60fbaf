// src/runcard/builder.rs

//! Assembles a [`RunConfiguration`] in layers: universal defaults, then the
//! process-family defaults, then job-file overrides, then run arguments.

use tracing::{debug, warn};

use crate::config::model::{GroupOverrides, ProcessOverrides, RunCardOverrides};
use crate::runcard::process::{defaults_for, ProcessVariant};
use crate::runcard::{
    BornSuppression, CkmMatrix, DibosonCouplings, ElectroweakParameters, Folding,
    ParameterGroups, RunConfiguration,
};
use crate::types::{Hadron, ProcessKind};

/// Arguments handed down by the job transform. Every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunArgs {
    /// Centre-of-mass energy in GeV.
    pub ecm_energy: Option<f64>,
    pub max_events: Option<i64>,
    pub random_seed: Option<i64>,
}

impl RunArgs {
    pub fn is_empty(&self) -> bool {
        self.ecm_energy.is_none() && self.max_events.is_none() && self.random_seed.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct RunConfigurationBuilder {
    config: RunConfiguration,
}

impl RunConfigurationBuilder {
    /// Universal defaults layered with the defaults of `kind`.
    pub fn new(kind: ProcessKind) -> Self {
        let family = defaults_for(kind);
        let config = RunConfiguration {
            process: family.process,
            numevts: 5500,
            ih1: Hadron::Proton,
            ih2: Hadron::Proton,
            ebeam1: 4000.0,
            ebeam2: 4000.0,
            lhans1: 10800,
            lhans2: 10800,
            facscfact: 1.0,
            renscfact: 1.0,
            iseed: 1,
            grid: family.grid,
            folding: family.folding,
            use_old_grid: true,
            use_old_ubound: true,
            withnegweights: 0,
            born: family.born,
            testplots: false,
            ptsqmin: None,
            compute_rwgt: false,
            groups: family.groups,
            electroweak: ElectroweakParameters::default(),
            ckm: CkmMatrix::default(),
            diboson: DibosonCouplings::default(),
            scales: family.scales,
        };
        Self { config }
    }

    pub fn apply_overrides(mut self, o: &RunCardOverrides) -> Self {
        let c = &mut self.config;
        set(&mut c.numevts, o.numevts);
        set(&mut c.ih1, o.ih1);
        set(&mut c.ih2, o.ih2);
        set(&mut c.ebeam1, o.ebeam1);
        set(&mut c.ebeam2, o.ebeam2);
        set(&mut c.lhans1, o.lhans1);
        set(&mut c.lhans2, o.lhans2);
        set(&mut c.facscfact, o.facscfact);
        set(&mut c.renscfact, o.renscfact);
        set(&mut c.iseed, o.iseed);
        set(&mut c.grid.ncall1, o.ncall1);
        set(&mut c.grid.itmx1, o.itmx1);
        set(&mut c.grid.ncall2, o.ncall2);
        set(&mut c.grid.itmx2, o.itmx2);
        set(&mut c.grid.nubound, o.nubound);
        set(&mut c.grid.xupbound, o.xupbound);
        set(&mut c.grid.iymax, o.iymax);
        set(&mut c.grid.ixmax, o.ixmax);
        set(&mut c.grid.xgriditeration, o.xgriditeration);
        set(&mut c.folding.foldcsi, o.foldcsi);
        set(&mut c.folding.foldy, o.foldy);
        set(&mut c.folding.foldphi, o.foldphi);
        set(&mut c.use_old_grid, o.use_old_grid);
        set(&mut c.use_old_ubound, o.use_old_ubound);
        set(&mut c.withnegweights, o.withnegweights);
        set(&mut c.born.bornktmin, o.bornktmin);
        set(&mut c.born.bornsuppfact, o.bornsuppfact);
        set(&mut c.testplots, o.testplots);
        if o.ptsqmin.is_some() {
            c.ptsqmin = o.ptsqmin;
        }
        set(&mut c.scales.runningscale, o.runningscale);
        set(&mut c.scales.hdamp, o.hdamp);
        if o.hfact.is_some() {
            c.scales.hfact = o.hfact;
        }
        self
    }

    /// Apply process-specific overrides. Keys that do not belong to the
    /// current family are rejected earlier by the job-file validation and
    /// are ignored here.
    pub fn apply_process_overrides(mut self, o: &ProcessOverrides) -> Self {
        match &mut self.config.process {
            ProcessVariant::Bb(hq) => set(&mut hq.qmass, o.qmass),
            ProcessVariant::Tt(tt) => {
                set(&mut tt.qmass, o.qmass);
                set(&mut tt.topdecaymode, o.topdecaymode);
            }
            ProcessVariant::Ggh(h) | ProcessVariant::Vbfh(h) => {
                set(&mut h.hmass, o.hmass);
                set(&mut h.hwidth, o.hwidth);
                set(&mut h.hdecaymode, o.hdecaymode);
            }
            ProcessVariant::W(w) => {
                set(&mut w.idvecbos, o.idvecbos);
                set(&mut w.vdecaymode, o.vdecaymode);
            }
            ProcessVariant::Z(z) => set(&mut z.vdecaymode, o.vdecaymode),
            ProcessVariant::Ww(d) | ProcessVariant::Wz(d) | ProcessVariant::Zz(d) => {
                set(&mut d.vdecaymode1, o.vdecaymode1);
                set(&mut d.vdecaymode2, o.vdecaymode2);
            }
            ProcessVariant::Dijet => {}
        }

        let couplings = &mut self.config.diboson;
        set(&mut couplings.delg1_z, o.delg1_z);
        set(&mut couplings.delg1_g, o.delg1_g);
        set(&mut couplings.lambda_z, o.lambda_z);
        set(&mut couplings.lambda_g, o.lambda_g);
        set(&mut couplings.delk_g, o.delk_g);
        set(&mut couplings.delk_z, o.delk_z);
        set(&mut couplings.tevscale, o.tevscale);
        self
    }

    pub fn apply_group_overrides(mut self, o: &GroupOverrides) -> Self {
        let g = &mut self.config.groups;
        set(&mut g.electroweak, o.electroweak);
        set(&mut g.ckm, o.ckm);
        set(&mut g.diboson, o.diboson);
        set(&mut g.scales, o.scales);
        self
    }

    pub fn reweight(mut self, enabled: bool) -> Self {
        self.config.compute_rwgt = enabled;
        self
    }

    /// Layer the job transform's run arguments on top.
    ///
    /// - `ecm_energy` sets both beam energies to half of it.
    /// - `max_events` replaces `numevts` when positive.
    /// - `random_seed` replaces `iseed`.
    pub fn apply_run_args(mut self, args: Option<&RunArgs>) -> Self {
        let Some(args) = args else {
            warn!("no run arguments supplied; using default beam energy, event count and seed");
            return self;
        };

        if let Some(ecm) = args.ecm_energy {
            self.config.ebeam1 = ecm / 2.0;
            self.config.ebeam2 = ecm / 2.0;
            debug!(ecm_energy = ecm, "beam energies set from run arguments");
        }
        if let Some(n) = args.max_events.filter(|n| *n > 0) {
            self.config.numevts = n;
        }
        if let Some(seed) = args.random_seed {
            self.config.iseed = seed;
        }
        self
    }

    pub fn numevts(mut self, n: i64) -> Self {
        self.config.numevts = n;
        self
    }

    pub fn withnegweights(mut self, value: i64) -> Self {
        self.config.withnegweights = value;
        self
    }

    pub fn folding(mut self, folding: Folding) -> Self {
        self.config.folding = folding;
        self
    }

    pub fn born(mut self, born: BornSuppression) -> Self {
        self.config.born = born;
        self
    }

    pub fn groups(mut self, groups: ParameterGroups) -> Self {
        self.config.groups = groups;
        self
    }

    pub fn build(self) -> RunConfiguration {
        self.config
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecm_energy_is_split_between_beams() {
        let args = RunArgs {
            ecm_energy: Some(8000.0),
            ..RunArgs::default()
        };
        let cfg = RunConfigurationBuilder::new(ProcessKind::W)
            .apply_run_args(Some(&args))
            .build();
        assert_eq!(cfg.ebeam1, 4000.0);
        assert_eq!(cfg.ebeam2, 4000.0);
    }

    #[test]
    fn non_positive_max_events_keeps_default() {
        let args = RunArgs {
            max_events: Some(-1),
            random_seed: Some(1234),
            ..RunArgs::default()
        };
        let cfg = RunConfigurationBuilder::new(ProcessKind::Z)
            .apply_run_args(Some(&args))
            .build();
        assert_eq!(cfg.numevts, 5500);
        assert_eq!(cfg.iseed, 1234);
    }

    #[test]
    fn missing_run_args_falls_back_to_defaults() {
        let cfg = RunConfigurationBuilder::new(ProcessKind::Tt)
            .apply_run_args(None)
            .build();
        assert_eq!(cfg.ebeam1, 4000.0);
        assert_eq!(cfg.numevts, 5500);
        assert_eq!(cfg.iseed, 1);
    }

    #[test]
    fn overrides_layer_over_family_defaults() {
        let overrides = RunCardOverrides {
            foldcsi: Some(2),
            lhans1: Some(260000),
            ptsqmin: Some(0.8),
            ..RunCardOverrides::default()
        };
        let cfg = RunConfigurationBuilder::new(ProcessKind::Dijet)
            .apply_overrides(&overrides)
            .build();
        assert_eq!(cfg.folding, Folding::new(2, 5, 1));
        assert_eq!(cfg.lhans1, 260000);
        assert_eq!(cfg.lhans2, 10800);
        assert_eq!(cfg.ptsqmin, Some(0.8));
        assert_eq!(cfg.born.bornsuppfact, 800.0);
    }

    #[test]
    fn process_overrides_reach_the_variant_payload() {
        let overrides = ProcessOverrides {
            idvecbos: Some(-24),
            vdecaymode: Some(2),
            ..ProcessOverrides::default()
        };
        let cfg = RunConfigurationBuilder::new(ProcessKind::W)
            .apply_process_overrides(&overrides)
            .build();
        match cfg.process {
            ProcessVariant::W(w) => {
                assert_eq!(w.idvecbos, -24);
                assert_eq!(w.vdecaymode, 2);
            }
            other => panic!("expected W variant, got {other:?}"),
        }
    }

    #[test]
    fn group_overrides_toggle_flags() {
        let cfg = RunConfigurationBuilder::new(ProcessKind::W)
            .apply_group_overrides(&GroupOverrides {
                ckm: Some(false),
                scales: Some(true),
                ..GroupOverrides::default()
            })
            .build();
        assert!(cfg.groups.electroweak);
        assert!(!cfg.groups.ckm);
        assert!(cfg.groups.scales);
    }
}
