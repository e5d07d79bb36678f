//! Fixtures shared by unit and integration tests.

use bifi_core::{CecModuleParams, ScanRecord, ScanResults};

/// Canadian Solar CS5P-220M from the CEC module database.
pub fn cs5p_220m() -> CecModuleParams {
    CecModuleParams {
        alpha_sc: 0.004539,
        a_ref: 2.6373,
        i_l_ref: 5.114,
        i_o_ref: 8.196e-10,
        r_sh_ref: 381.68,
        r_s: 1.065,
        adjust: 8.7,
    }
}

/// In-memory results with every sensor on module glass, one record per row of
/// `front`/`rear` (timestamps × positions).
pub fn scan_results(front: &[Vec<f64>], rear: &[Vec<f64>]) -> ScanResults {
    front
        .iter()
        .zip(rear)
        .enumerate()
        .map(|(t, (f, r))| {
            let record = ScanRecord {
                wm2_front: f.clone(),
                wm2_back: r.clone(),
                mattype: vec!["a10.3.a0.PVmodule.6457".to_string(); f.len()],
                rear_mat: vec!["a10.3.a0.PVmodule.2310".to_string(); r.len()],
                timestamp: None,
                mod_number: None,
                row: None,
            };
            (t, record)
        })
        .collect()
}
