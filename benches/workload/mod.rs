//! A synthetic 4-wide pipeline that drives the renamer through rename,
//! dispatch, writeback, branch resolution and commit.

use criterion::black_box;
use renamer::{AlIndex, ArchReg, CheckpointId, Dest, InstKind, Renamer, RenamerConfig};

pub const WIDTH: usize = 4;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub retired: u64,
    pub branches: u64,
    pub mispredicts: u64,
}

/// Runs `cycles` cycles. Every other bundle leads with a branch, and one branch
/// in `mispredict_every` goes the wrong way.
pub fn run(cycles: usize, mispredict_every: u64) -> Summary {
    let mut rn = Renamer::new(RenamerConfig::default()).unwrap();
    let n_log = rn.config().n_log_regs;
    let mut window: Vec<(AlIndex, Option<Dest>, Option<CheckpointId>)> = Vec::new();
    let mut pc = 0u64;
    let mut bundles = 0u64;
    let mut summary = Summary::default();

    for _ in 0..cycles {
        // Commit whatever completed last cycle.
        while let Some(info) = rn.precommit() {
            if !info.outcome.complete {
                break;
            }
            rn.commit();
            window.remove(0);
            summary.retired += 1;
        }

        // Writeback and branch resolution for the oldest in-flight work.
        let mut mispredicted = None;
        for (i, (idx, dest, cp)) in window.iter_mut().enumerate().take(WIDTH) {
            if let Some(d) = dest {
                rn.write(d.phys, pc);
                rn.set_ready(d.phys);
            }
            if let Some(id) = cp.take() {
                summary.branches += 1;
                let correct = summary.branches % mispredict_every != 0;
                rn.resolve(*idx, id, correct);
                if !correct {
                    summary.mispredicts += 1;
                    mispredicted = Some(i);
                }
            }
            rn.set_complete(*idx);
            if mispredicted.is_some() {
                break;
            }
        }
        if let Some(i) = mispredicted {
            window.truncate(i + 1);
        }

        // Rename and dispatch a new bundle.
        if rn.stall_reg(WIDTH) || rn.stall_dispatch(WIDTH) || rn.stall_branch(1) {
            continue;
        }
        let has_branch = bundles % 2 == 0;
        bundles += 1;
        for slot in 0..WIDTH {
            pc += 4;
            let src = rn.rename_rsrc(ArchReg((pc as usize / 4) % n_log));
            black_box(rn.is_ready(src));

            if slot == 0 && has_branch {
                let id = rn.checkpoint();
                let idx = rn.dispatch_inst(None, InstKind::branch(), pc);
                window.push((idx, None, Some(id)));
            } else {
                let arch = ArchReg((pc as usize / 4 + 1) % n_log);
                let phys = rn.rename_rdst(arch);
                let dest = Dest::new(arch, phys);
                let idx = rn.dispatch_inst(Some(dest), InstKind::ALU, pc);
                window.push((idx, Some(dest), None));
            }
        }
    }

    summary
}
