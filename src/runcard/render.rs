// src/runcard/render.rs

//! Sanity checks and rendering of `powheg.input`.

use std::fmt;
use std::path::Path;

use tracing::{info, warn};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::runcard::{BornSuppression, CardEntry, Folding, RunCard, RunConfiguration};

/// Non-fatal inconsistencies found before the card is written.
#[derive(Debug, Clone, PartialEq)]
pub enum SanityWarning {
    /// Negative-weight generation and folding do not mix; folds were reset.
    FoldingResetForNegativeWeights { previous: Folding },
    /// Born suppression without a kt cut yields fixed-order output only.
    BornSuppressionWithoutKtCut { born: BornSuppression },
}

impl fmt::Display for SanityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanityWarning::FoldingResetForNegativeWeights { previous } => write!(
                f,
                "withnegweights is set; resetting foldcsi/foldy/foldphi from {}/{}/{} to 1/1/1",
                previous.foldcsi, previous.foldy, previous.foldphi
            ),
            SanityWarning::BornSuppressionWithoutKtCut { born } => write!(
                f,
                "bornsuppfact = {} but bornktmin = {}; output will only be valid at fixed order",
                born.bornsuppfact, born.bornktmin
            ),
        }
    }
}

/// Run the sanity checks and return the folding that will actually be
/// written, along with any warnings raised.
fn sanity_check(config: &RunConfiguration) -> (Folding, Vec<SanityWarning>) {
    let mut warnings = Vec::new();
    let mut folding = config.folding;

    if config.withnegweights != 0 && !folding.is_unit() {
        warnings.push(SanityWarning::FoldingResetForNegativeWeights { previous: folding });
        folding = Folding::UNIT;
    }

    if config.born.bornsuppfact > 0.0 && config.born.bornktmin <= 0.0 {
        warnings.push(SanityWarning::BornSuppressionWithoutKtCut { born: config.born });
    }

    for w in &warnings {
        warn!("{w}");
    }

    (folding, warnings)
}

/// Render the card for `config`. Deterministic: the same configuration
/// always yields the same entries in the same order.
pub fn render(config: &RunConfiguration) -> RunCard {
    let (folding, warnings) = sanity_check(config);
    let c = config;

    let mut entries = vec![
        CardEntry::new("numevts", c.numevts, "number of events to be generated"),
        CardEntry::new("ih1", c.ih1.code(), "hadron 1 (1 for protons, -1 for antiprotons)"),
        CardEntry::new("ih2", c.ih2.code(), "hadron 2 (1 for protons, -1 for antiprotons)"),
        CardEntry::new("ebeam1", c.ebeam1, "energy of beam 1"),
        CardEntry::new("ebeam2", c.ebeam2, "energy of beam 2"),
        CardEntry::new("lhans1", c.lhans1, "pdf set for hadron 1 (LHA numbering)"),
        CardEntry::new("lhans2", c.lhans2, "pdf set for hadron 2 (LHA numbering)"),
        CardEntry::new("facscfact", c.facscfact, "factorization scale factor: mufact=muref*facscfact"),
        CardEntry::new("renscfact", c.renscfact, "renormalization scale factor: muren=muref*renscfact"),
        CardEntry::new("iseed", c.iseed, "initialize random number sequence"),
        CardEntry::new("ncall1", c.grid.ncall1, "number of calls for initializing the integration grid"),
        CardEntry::new("itmx1", c.grid.itmx1, "number of iterations for initializing the integration grid"),
        CardEntry::new("ncall2", c.grid.ncall2, "number of calls for computing the integral and finding upper bound"),
        CardEntry::new("itmx2", c.grid.itmx2, "number of iterations for computing the integral and finding upper bound"),
        CardEntry::new("foldcsi", folding.foldcsi, "number of folds on csi integration"),
        CardEntry::new("foldy", folding.foldy, "number of folds on y integration"),
        CardEntry::new("foldphi", folding.foldphi, "number of folds on phi integration"),
        CardEntry::new("nubound", c.grid.nubound, "number of bbarra calls to setup norm of upper bounding function"),
        CardEntry::new("xupbound", c.grid.xupbound, "increase upper bound for radiation generation"),
        CardEntry::new("iymax", c.grid.iymax, "normalization of upper bounding function in y"),
        CardEntry::new("ixmax", c.grid.ixmax, "normalization of upper bounding function in x"),
        CardEntry::new("xgriditeration", c.grid.xgriditeration, "number of iterations for the importance sampling grid"),
        CardEntry::new("use-old-grid", c.use_old_grid, "if 1 use old grid if file pwggrids.dat is present"),
        CardEntry::new("use-old-ubound", c.use_old_ubound, "if 1 use norm of upper bounding function stored in pwgubound.dat"),
        CardEntry::new("withnegweights", c.withnegweights, "if 1 generate negative weighted events too"),
        CardEntry::new("bornktmin", c.born.bornktmin, "generation cut: minimum kt in underlying Born"),
        CardEntry::new("bornsuppfact", c.born.bornsuppfact, "Born suppression factor"),
        CardEntry::new("testplots", c.testplots, "if 1 do NLO and PWHG distributions"),
    ];

    if let Some(ptsqmin) = c.ptsqmin {
        entries.push(CardEntry::new("ptsqmin", ptsqmin, "minimum pt^2 for radiation"));
    }
    if c.compute_rwgt {
        entries.push(CardEntry::new("compute_rwgt", true, "reweight existing events in pwgevents.lhe"));
    }

    entries.extend(c.process.entries());

    if c.groups.electroweak {
        let ew = &c.electroweak;
        entries.extend([
            CardEntry::new("Zmass", ew.zmass, "Z boson mass"),
            CardEntry::new("Zwidth", ew.zwidth, "Z boson width"),
            CardEntry::new("Wmass", ew.wmass, "W boson mass"),
            CardEntry::new("Wwidth", ew.wwidth, "W boson width"),
            CardEntry::new("sthw2", ew.sthw2, "sin**2 theta_W"),
            CardEntry::new("alphaem", ew.alphaem, "electromagnetic coupling"),
        ]);
    }

    if c.groups.ckm {
        let m = &c.ckm;
        entries.extend([
            CardEntry::new("CKM_Vud", m.vud, "CKM matrix element"),
            CardEntry::new("CKM_Vus", m.vus, "CKM matrix element"),
            CardEntry::new("CKM_Vub", m.vub, "CKM matrix element"),
            CardEntry::new("CKM_Vcd", m.vcd, "CKM matrix element"),
            CardEntry::new("CKM_Vcs", m.vcs, "CKM matrix element"),
            CardEntry::new("CKM_Vcb", m.vcb, "CKM matrix element"),
            CardEntry::new("CKM_Vtd", m.vtd, "CKM matrix element"),
            CardEntry::new("CKM_Vts", m.vts, "CKM matrix element"),
            CardEntry::new("CKM_Vtb", m.vtb, "CKM matrix element"),
        ]);
    }

    if c.groups.diboson {
        let d = &c.diboson;
        entries.extend([
            CardEntry::new("delg1_z", d.delg1_z, "anomalous coupling: Delta g1 (Z)"),
            CardEntry::new("delg1_g", d.delg1_g, "anomalous coupling: Delta g1 (gamma)"),
            CardEntry::new("lambda_z", d.lambda_z, "anomalous coupling: lambda (Z)"),
            CardEntry::new("lambda_g", d.lambda_g, "anomalous coupling: lambda (gamma)"),
            CardEntry::new("delk_g", d.delk_g, "anomalous coupling: Delta kappa (gamma)"),
            CardEntry::new("delk_z", d.delk_z, "anomalous coupling: Delta kappa (Z)"),
            CardEntry::new("tevscale", d.tevscale, "form-factor scale in TeV"),
        ]);
    }

    if c.groups.scales {
        let s = &c.scales;
        entries.push(CardEntry::new("runningscale", s.runningscale, "choice of reference scale"));
        entries.push(CardEntry::new("hdamp", s.hdamp, "Born-zero damping parameter"));
        if let Some(hfact) = s.hfact {
            entries.push(CardEntry::new("hfact", hfact, "damping factor for high-pt radiation"));
        }
    }

    RunCard { entries, warnings }
}

/// Render `config` and write it to `path`. Filesystem errors propagate; a
/// partially written file is left as is.
pub fn write_run_card(
    fs: &dyn FileSystem,
    path: &Path,
    config: &RunConfiguration,
) -> Result<RunCard> {
    let card = render(config);
    fs.write(path, card.to_text().as_bytes())?;
    info!(
        path = %path.display(),
        process = %config.process.kind(),
        entries = card.entries.len(),
        digest = %card.digest(),
        "run card written"
    );
    Ok(card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::runcard::{CardValue, ParameterGroups, RunConfigurationBuilder};
    use crate::types::ProcessKind;

    #[test]
    fn negative_weights_reset_folding() {
        let cfg = RunConfigurationBuilder::new(ProcessKind::W)
            .withnegweights(1)
            .folding(Folding::new(5, 5, 2))
            .build();

        let card = render(&cfg);
        assert_eq!(card.get("foldcsi").map(ToString::to_string).as_deref(), Some("1"));
        assert_eq!(card.get("foldy").map(ToString::to_string).as_deref(), Some("1"));
        assert_eq!(card.get("foldphi").map(ToString::to_string).as_deref(), Some("1"));
        assert_eq!(
            card.warnings,
            vec![SanityWarning::FoldingResetForNegativeWeights {
                previous: Folding::new(5, 5, 2)
            }]
        );
    }

    #[test]
    fn folding_kept_without_negative_weights() {
        let cfg = RunConfigurationBuilder::new(ProcessKind::W)
            .folding(Folding::new(5, 5, 2))
            .build();
        let card = render(&cfg);
        assert_eq!(card.get("foldphi"), Some(&CardValue::Int(2)));
        assert!(card.warnings.is_empty());
    }

    #[test]
    fn born_suppression_without_cut_warns_but_renders() {
        let cfg = RunConfigurationBuilder::new(ProcessKind::Dijet)
            .born(BornSuppression {
                bornktmin: 0.0,
                bornsuppfact: 800.0,
            })
            .build();
        let card = render(&cfg);
        assert!(matches!(
            card.warnings.as_slice(),
            [SanityWarning::BornSuppressionWithoutKtCut { .. }]
        ));
        assert_eq!(card.get("bornsuppfact"), Some(&CardValue::Float(800.0)));
    }

    #[test]
    fn optional_groups_follow_flags() {
        let cfg = RunConfigurationBuilder::new(ProcessKind::Z)
            .groups(ParameterGroups {
                electroweak: false,
                ckm: true,
                diboson: false,
                scales: true,
            })
            .build();
        let card = render(&cfg);
        let keys: Vec<_> = card.keys().collect();
        assert!(!keys.contains(&"Zmass"));
        assert!(keys.contains(&"CKM_Vtb"));
        assert!(!keys.contains(&"delk_z"));
        assert!(keys.contains(&"hdamp"));
        assert!(!keys.contains(&"hfact"));
    }

    #[test]
    fn reweight_adds_compute_rwgt() {
        let plain = render(&RunConfigurationBuilder::new(ProcessKind::W).build());
        assert!(plain.get("compute_rwgt").is_none());

        let rwgt = render(&RunConfigurationBuilder::new(ProcessKind::W).reweight(true).build());
        assert_eq!(rwgt.get("compute_rwgt"), Some(&CardValue::Int(1)));
    }

    #[test]
    fn writes_through_filesystem() {
        let fs = MockFileSystem::new();
        let cfg = RunConfigurationBuilder::new(ProcessKind::Tt).build();
        let card = write_run_card(&fs, Path::new("./powheg.input"), &cfg).unwrap();

        let text = fs.read_to_string(Path::new("./powheg.input")).unwrap();
        assert_eq!(text, card.to_text());
        assert!(text.starts_with("numevts 5500 ! number of events to be generated\n"));
        assert!(text.contains("\nebeam1 4000.0 ! energy of beam 1\n"));
        assert!(text.contains("\nqmass 172.5 ! mass of heavy quark in GeV\n"));
        assert!(text.contains("\nhdamp 172.5 ! Born-zero damping parameter\n"));
    }
}
