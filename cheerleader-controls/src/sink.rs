use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::cpal::traits::HostTrait;
use rodio::{Decoder, decoder::DecoderBuilder, queue::queue};
use tokio::sync::watch::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::Result;
use crate::notification::NotificationBroadcast;

/// Audio device seam of the player.
///
/// `load` returns as soon as the download started; `done_buffering` fires
/// once the stream is decoded and queued, `load_failed` when it never will be.
pub trait Output {
    fn done_buffering(&self) -> Receiver<()>;
    fn load_failed(&self) -> Receiver<()>;
    fn load(&mut self, url: String) -> Result<()>;
    fn play(&self);
    fn pause(&self);
    fn seek(&self, position: Duration) -> Result<()>;
    fn clear(&mut self);
    fn set_volume(&mut self, volume: f32);
}

pub struct Sink {
    stream_handle: Option<rodio::OutputStream>,
    sink: Option<rodio::Sink>,
    current_download: Option<JoinHandle<()>>,
    done_buffering_tx: Sender<()>,
    load_failed_tx: Sender<()>,
    broadcast: Arc<NotificationBroadcast>,
    volume: f32,
}

impl Sink {
    pub fn new(broadcast: Arc<NotificationBroadcast>, volume: f32) -> Self {
        let (done_buffering_tx, _) = watch::channel(());
        let (load_failed_tx, _) = watch::channel(());

        Self {
            sink: Default::default(),
            stream_handle: Default::default(),
            current_download: Default::default(),
            done_buffering_tx,
            load_failed_tx,
            broadcast,
            volume,
        }
    }
}

impl Output for Sink {
    fn done_buffering(&self) -> Receiver<()> {
        self.done_buffering_tx.subscribe()
    }

    fn load_failed(&self) -> Receiver<()> {
        self.load_failed_tx.subscribe()
    }

    fn load(&mut self, url: String) -> Result<()> {
        self.clear();

        let mut stream_handle = open_default_stream()?;
        stream_handle.log_on_drop(false);

        let (sender, receiver) = queue(true);
        let sink = rodio::Sink::connect_new(stream_handle.mixer());
        sink.append(receiver);
        set_volume(&sink, self.volume);

        let done_buffering_tx = self.done_buffering_tx.clone();
        let load_failed_tx = self.load_failed_tx.clone();
        let broadcast = self.broadcast.clone();

        let handle = tokio::spawn(async move {
            debug!(%url, "downloading stream");

            match download(&url).await {
                Ok(source) => {
                    sender.append(source);
                    done_buffering_tx.send_replace(());
                }
                Err(message) => {
                    broadcast.send_error(message.to_string());
                    load_failed_tx.send_replace(());
                }
            }
        });

        self.current_download = Some(handle);
        self.sink = Some(sink);
        self.stream_handle = Some(stream_handle);

        Ok(())
    }

    fn play(&self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn pause(&self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn seek(&self, position: Duration) -> Result<()> {
        if let Some(sink) = &self.sink {
            sink.try_seek(position)?;
        }

        Ok(())
    }

    fn clear(&mut self) {
        if let Some(handle) = self.current_download.take() {
            handle.abort();
        }

        self.sink = None;
        self.stream_handle = None;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            set_volume(sink, volume);
        }
    }
}

async fn download(url: &str) -> Result<Decoder<Cursor<Vec<u8>>>, &'static str> {
    let resp = reqwest::get(url)
        .await
        .map_err(|_| "Unable to get track audio stream")?;
    let resp = resp
        .error_for_status()
        .map_err(|_| "Audio stream refused by server")?;
    let body = resp
        .bytes()
        .await
        .map_err(|_| "Unable to get audio stream bytes")?;

    DecoderBuilder::new()
        .with_data(Cursor::new(body.to_vec()))
        .with_seekable(true)
        .build()
        .map_err(|_| "Unable to decode audio stream")
}

fn set_volume(sink: &rodio::Sink, volume: f32) {
    let volume = volume.clamp(0.0, 1.0).powi(3);
    sink.set_volume(volume);
}

fn open_default_stream() -> Result<rodio::OutputStream> {
    rodio::OutputStreamBuilder::from_default_device()
        .and_then(|x| x.open_stream())
        .or_else(|default_err| {
            let mut devices = rodio::cpal::default_host().output_devices()?;

            Ok(devices
                .find_map(|d| {
                    rodio::OutputStreamBuilder::from_device(d)
                        .and_then(|x| x.open_stream_or_fallback())
                        .ok()
                })
                .ok_or(default_err)?)
        })
}
