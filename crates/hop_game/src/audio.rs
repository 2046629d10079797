//! Fire-and-forget sound playback.
//!
//! The simulation only emits [`SoundCue`]s. With the `audio` feature the
//! player decodes WAV files through rodio on its own output thread; without
//! it cues are only logged. Either way the sound files must exist at startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use hop_core::ResourceError;

use crate::config::{asset_path, SoundConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Jump,
    Death,
    Music,
}

pub struct AudioPlayer {
    clips: HashMap<SoundCue, PathBuf>,
    #[cfg(feature = "audio")]
    output: Option<backend::Output>,
}

impl AudioPlayer {
    pub fn new(config: &SoundConfig, root: &Path) -> Result<Self, ResourceError> {
        let mut clips = HashMap::new();
        let mut entries = vec![(SoundCue::Jump, &config.jump), (SoundCue::Death, &config.death)];
        if let Some(music) = &config.music {
            entries.push((SoundCue::Music, music));
        }
        for (cue, relative) in entries {
            let path = asset_path(root, relative);
            std::fs::metadata(&path).map_err(|e| ResourceError::read(&path, e))?;
            clips.insert(cue, path);
        }
        if cfg!(not(feature = "audio")) {
            log::info!("Built without the `audio` feature; sound cues are only logged");
        }

        Ok(Self {
            clips,
            #[cfg(feature = "audio")]
            output: backend::Output::open(),
        })
    }

    pub fn has_cue(&self, cue: SoundCue) -> bool {
        self.clips.contains_key(&cue)
    }

    pub fn play(&self, cue: SoundCue) {
        let Some(path) = self.clips.get(&cue) else {
            log::debug!("No sound configured for {:?}", cue);
            return;
        };
        log::debug!("Play {:?} ({})", cue, path.display());
        self.dispatch(path, cue);
    }

    #[cfg(feature = "audio")]
    fn dispatch(&self, path: &Path, cue: SoundCue) {
        if let Some(output) = &self.output {
            output.play(path, cue == SoundCue::Music);
        }
    }

    #[cfg(not(feature = "audio"))]
    fn dispatch(&self, _path: &Path, _cue: SoundCue) {}

    /// Start the looping background track, if one is configured.
    pub fn start_music(&self) {
        if self.has_cue(SoundCue::Music) {
            self.play(SoundCue::Music);
        }
    }
}

#[cfg(feature = "audio")]
mod backend {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    pub struct Output {
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl Output {
        pub fn open() -> Option<Self> {
            match OutputStream::try_default() {
                Ok((stream, handle)) => Some(Self {
                    _stream: stream,
                    handle,
                }),
                Err(e) => {
                    log::warn!("No audio output device, sounds disabled: {e}");
                    None
                }
            }
        }

        pub fn play(&self, path: &Path, looped: bool) {
            let file = match File::open(path) {
                Ok(file) => BufReader::new(file),
                Err(e) => {
                    log::warn!("Failed to open sound {}: {e}", path.display());
                    return;
                }
            };
            let sink = match Sink::try_new(&self.handle) {
                Ok(sink) => sink,
                Err(e) => {
                    log::warn!("Failed to create audio sink: {e}");
                    return;
                }
            };
            let appended = if looped {
                Decoder::new_looped(file).map(|source| sink.append(source))
            } else {
                Decoder::new(file).map(|source| sink.append(source))
            };
            match appended {
                Ok(()) => sink.detach(),
                Err(e) => log::warn!("Failed to decode sound {}: {e}", path.display()),
            }
        }
    }
}
