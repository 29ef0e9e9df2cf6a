//! Spawns one `core_affinity`-pinned thread per CPU core, each pulling rows
//! off a shared atomic counter until the frame is exhausted (spec.md §5
//! "distributes rows across worker threads... dynamic schedule"). Grounded
//! on the teacher's `renderer/machinery.rs` work-queue shape; the unit of
//! work is shrunk from an arbitrary tile to a single scanline, and the
//! generic `Object`/`Scene<O>` pair is replaced with the concrete
//! [`Scene`]/[`RenderConfig`] this crate traces against.

use std::{
    ops::Deref as _,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use image::{GenericImage, GenericImageView, RgbaImage};

use crate::{
    camera::Camera,
    config::RenderConfig,
    geometry::ScreenBlock,
    renderer::{RenderSettings, RenderStats, worker::Worker},
    scene::Scene,
    screen_block::{self, ScreenBlockExt as _},
};

pub fn render<
    F1: Fn(ScreenBlock) + Send + Sync + 'static,
    F2: Fn(ScreenBlock, RenderProgressSnapshot) + Send + Sync + 'static,
>(
    scene: Scene,
    camera: Camera,
    settings: RenderSettings,
    config: RenderConfig,
    started_row_callback: F1,
    finished_row_callback: F2,
) -> anyhow::Result<RenderProgress> {
    let cores = core_affinity::get_core_ids().expect("We need a CPU list!");
    let worker_count = cores.len().max(1);

    let resolution = camera.get_resolution();
    let image = RgbaImage::new(resolution.x, resolution.y);
    let row_ordering = screen_block::full_frame(&resolution).row_ordering();

    let state = Arc::new(RenderState {
        scene,
        camera,
        settings,
        config,

        image: Mutex::new(image),

        row_ordering,
        next_row_index: AtomicUsize::new(0),

        stats: Mutex::new(RenderStats::default()),
        start_time: Instant::now(),
        end: Mutex::new((0, None)),
    });
    let started_row_callback = Arc::new(started_row_callback);
    let finished_row_callback = Arc::new(finished_row_callback);

    let threads = cores
        .into_iter()
        .enumerate()
        .map(|(worker_id, core)| {
            let state = Arc::clone(&state);
            let started_row_callback = Arc::clone(&started_row_callback);
            let finished_row_callback = Arc::clone(&finished_row_callback);

            thread::Builder::new()
                .name(format!("worker{worker_id}"))
                .spawn(move || {
                    core_affinity::set_for_current(core);

                    let mut worker = Worker::new(worker_id);
                    let mut buffer = RgbaImage::new(resolution.x, 1);
                    let mut local_stats = RenderStats::default();
                    let row_count = state.row_ordering.len();

                    let (_, Some(mut row)) = state.get_next_row() else {
                        return;
                    };

                    loop {
                        (started_row_callback)(*row);

                        worker.render_row(
                            &state.scene,
                            &state.camera,
                            &state.settings,
                            &state.config,
                            row,
                            &mut buffer,
                            &mut local_stats,
                        );
                        state
                            .image
                            .lock()
                            .expect("Poisoned lock!")
                            .copy_from(buffer.view(0, 0, row.width(), row.height()).deref(), row.min.x, row.min.y)
                            .unwrap_or_else(|_| unreachable!("The row buffer should always fit into the output"));

                        let (new_row_id, new_row) = state.get_next_row();

                        (finished_row_callback)(
                            *row,
                            RenderProgressSnapshot { finished: new_row_id.saturating_sub(worker_count), total: row_count },
                        );

                        match new_row {
                            Some(new_row) => row = new_row,
                            None => break,
                        }
                    }

                    let elapsed = Instant::elapsed(&state.start_time);
                    {
                        let mut stats = state.stats.lock().expect("Poisoned lock!");
                        *stats = stats.merge(&local_stats);
                    }

                    let mut lock = state.end.lock().unwrap();
                    lock.0 += 1;
                    if lock.0 == worker_count {
                        lock.1 = Some(elapsed);
                    }
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RenderProgress { render_state: state, worker_count, threads })
}

pub struct RenderProgress {
    render_state: Arc<RenderState>,
    worker_count: usize,
    threads: Vec<JoinHandle<()>>,
}

impl RenderProgress {
    /// Return number of processed and total rows.
    pub fn progress(&self) -> RenderProgressSnapshot {
        RenderProgressSnapshot {
            finished: self.render_state.next_row_index.load(Ordering::Acquire).saturating_sub(self.worker_count),
            total: self.render_state.row_ordering.len(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.threads.iter().all(|handle| handle.is_finished())
    }

    /// Returns elapsed time since the start of the render. Stops
    /// incrementing once the render finishes.
    pub fn elapsed(&self) -> Duration {
        self.render_state.end.lock().unwrap().1.unwrap_or_else(|| self.render_state.start_time.elapsed())
    }

    /// Signal the workers to abort.
    /// Any running workers will still finish their row, but no new ones will be started.
    pub fn abort(&self) {
        self.render_state.next_row_index.store(self.render_state.row_ordering.len(), Ordering::Release);
    }

    /// Wait for the workers to finish.
    pub fn wait(&mut self) {
        self.threads.drain(..).for_each(|handle| handle.join().unwrap());
    }

    pub fn image(&self) -> &Mutex<RgbaImage> {
        &self.render_state.image
    }

    /// Per-thread primary/shadow ray counters, merged across every worker so
    /// far (spec.md §5 "caller-owned accumulators... aggregated after the
    /// fact").
    pub fn stats(&self) -> RenderStats {
        self.render_state.stats.lock().expect("Poisoned lock!").clone()
    }
}

pub struct RenderProgressSnapshot {
    pub finished: usize,
    pub total: usize,
}

impl RenderProgressSnapshot {
    pub fn percent(&self) -> f32 {
        100.0 * (self.finished as f32) / (self.total as f32)
    }
}

struct RenderState {
    scene: Scene,
    camera: Camera,
    settings: RenderSettings,
    config: RenderConfig,

    image: Mutex<RgbaImage>,

    row_ordering: Vec<ScreenBlock>,
    next_row_index: AtomicUsize,

    stats: Mutex<RenderStats>,
    start_time: Instant,
    /// Number of workers that finished, elapsed time
    end: Mutex<(usize, Option<Duration>)>,
}

impl RenderState {
    fn get_next_row(&self) -> (usize, Option<&ScreenBlock>) {
        let id = self.next_row_index.fetch_add(1, Ordering::AcqRel);
        (id, self.row_ordering.get(id))
    }
}
