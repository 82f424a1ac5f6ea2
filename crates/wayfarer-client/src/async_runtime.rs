//! Background task spawning for network requests.
//!
//! Native builds drive futures on the Tokio runtime from `bevy_tokio_tasks`,
//! which reqwest needs. WASM builds hand them to Bevy's
//! `AsyncComputeTaskPool`, where reqwest goes through the browser's fetch.
//! Either way results come back to systems over an `async_channel`.

use bevy::prelude::*;

/// Installs the platform's async runtime.
pub struct AsyncRuntimePlugin;

impl Plugin for AsyncRuntimePlugin {
    fn build(&self, app: &mut App) {
        #[cfg(target_family = "wasm")]
        let _ = app;

        #[cfg(not(target_family = "wasm"))]
        app.add_plugins(bevy_tokio_tasks::TokioTasksPlugin::default());
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use std::future::Future;

    use bevy::ecs::system::SystemParam;
    use bevy::prelude::*;

    /// System parameter that runs a future in the background and delivers
    /// its output to a channel.
    #[derive(SystemParam)]
    pub struct TaskSpawner<'w, 's> {
        runtime: Res<'w, bevy_tokio_tasks::TokioTasksRuntime>,
        // Matches the WASM signature.
        #[allow(dead_code)]
        _local: Local<'s, ()>,
    }

    impl TaskSpawner<'_, '_> {
        /// Run `future` to completion on a Tokio worker and send its output
        /// on `reply`. A closed channel drops the output.
        pub fn spawn_reply<T, F>(&self, reply: async_channel::Sender<T>, future: F)
        where
            T: Send + 'static,
            F: Future<Output = T> + Send + 'static,
        {
            self.runtime.spawn_background_task(move |_ctx| async move {
                let _ = reply.send(future.await).await;
            });
        }
    }
}

#[cfg(target_family = "wasm")]
mod wasm {
    use std::future::Future;

    use bevy::ecs::system::SystemParam;
    use bevy::prelude::*;
    use bevy::tasks::AsyncComputeTaskPool;

    /// System parameter that runs a future in the background and delivers
    /// its output to a channel.
    #[derive(SystemParam)]
    pub struct TaskSpawner<'w, 's> {
        #[allow(dead_code)]
        _local: Local<'s, ()>,
        #[allow(dead_code)]
        _marker: std::marker::PhantomData<&'w ()>,
    }

    impl TaskSpawner<'_, '_> {
        /// Run `future` on the browser's event loop and send its output on
        /// `reply`. No `Send` bound: there is only one thread.
        pub fn spawn_reply<T, F>(&self, reply: async_channel::Sender<T>, future: F)
        where
            T: 'static,
            F: Future<Output = T> + 'static,
        {
            AsyncComputeTaskPool::get()
                .spawn_local(async move {
                    let _ = reply.send(future.await).await;
                })
                .detach();
        }
    }
}

#[cfg(not(target_family = "wasm"))]
pub use native::TaskSpawner;
#[cfg(target_family = "wasm")]
pub use wasm::TaskSpawner;
