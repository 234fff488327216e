use clap::{Parser, Subcommand, ValueEnum};
use hound::WavSpec;
use std::fs::File;
use std::path::{Path, PathBuf};
use tonelink_core::{
    synth, ClipLibrary, Decoder, DeviceProfile, Result as CoreResult, TonelinkError,
    TransmitEncoder, SAMPLE_RATE, WINDOW_SAMPLES,
};

#[derive(Parser)]
#[command(name = "tonelink")]
#[command(about = "Acoustic pairing modem for radio-less peripherals")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Standard,
    Alternate,
}

impl From<Profile> for DeviceProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Standard => DeviceProfile::Standard,
            Profile::Alternate => DeviceProfile::Alternate,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a payload as a reference wire-format WAV file
    Encode {
        /// Payload value (9 bits, 0-511)
        payload: u16,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,
    },

    /// Decode a WAV recording and print every recovered payload
    Decode {
        /// Input WAV file (mono, 44.1 kHz)
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Burst detection threshold (sensitivity knob)
        #[arg(short, long, default_value = "1024")]
        threshold: i16,
    },

    /// Build a transmit buffer from pre-recorded clips and write it as WAV
    Transmit {
        /// Payload value
        payload: u32,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,

        /// Directory holding the clip set (<name>.wav files)
        #[arg(short, long)]
        clip_dir: PathBuf,

        /// Number of payload bits to send
        #[arg(short, long, default_value = "8")]
        bits: u8,

        /// Device clip-set profile
        #[arg(short, long, value_enum, default_value_t = Profile::Standard)]
        profile: Profile,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { payload, output } => encode_command(payload, &output)?,
        Commands::Decode { input, threshold } => decode_command(&input, threshold)?,
        Commands::Transmit {
            payload,
            output,
            clip_dir,
            bits,
            profile,
        } => transmit_command(payload, &output, &clip_dir, bits, profile.into())?,
    }

    Ok(())
}

fn mono_spec() -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE as u32,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

fn encode_command(payload: u16, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Half a window of lead-in silence so the frame sits inside the file
    // the way a live capture would see it
    let samples = synth::frame_in_silence(payload, WINDOW_SAMPLES / 2, WINDOW_SAMPLES)?;
    println!("Encoded payload {} into {} samples", payload, samples.len());

    let file = File::create(output)?;
    let mut writer = hound::WavWriter::new(file, mono_spec())?;
    for sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    println!("Wrote {}", output.display());
    Ok(())
}

fn decode_command(input: &Path, threshold: i16) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(input)?;
    let mut reader = hound::WavReader::new(file)?;

    let spec = reader.spec();
    println!(
        "Read WAV: {} Hz, {} channels, {} bits",
        spec.sample_rate, spec.channels, spec.bits_per_sample
    );
    if spec.sample_rate != SAMPLE_RATE as u32 {
        log::warn!(
            "expected {} Hz capture, decoding {} Hz anyway",
            SAMPLE_RATE,
            spec.sample_rate
        );
    }

    let samples: Vec<i16> = match spec.bits_per_sample {
        16 => {
            let int_samples: Result<Vec<i16>, _> = reader.samples::<i16>().collect();
            int_samples?
        }
        32 => {
            let float_samples: Result<Vec<f32>, _> = reader.samples::<f32>().collect();
            float_samples?
                .into_iter()
                .map(|s| (s.max(-1.0).min(1.0) * 32767.0) as i16)
                .collect()
        }
        _ => {
            return Err(format!("Unsupported bit depth: {}", spec.bits_per_sample).into());
        }
    };

    println!("Extracted {} samples", samples.len());

    let mut decoder = Decoder::with_threshold(threshold);
    let mut found = 0;
    for chunk in samples.chunks(4096) {
        if let Some(payload) = decoder.push(chunk) {
            println!("Decoded payload: {} ({:#05x})", payload, payload);
            found += 1;
        }
    }

    if found == 0 {
        println!("No frame decoded");
    }
    Ok(())
}

/// Clip library backed by a directory of <name>.wav files.
struct DirClipLibrary {
    dir: PathBuf,
}

impl ClipLibrary for DirClipLibrary {
    fn load(&self, name: &str) -> CoreResult<Vec<u8>> {
        let path = self.dir.join(format!("{}.wav", name));
        std::fs::read(&path).map_err(|_| TonelinkError::ClipNotFound(name.to_string()))
    }
}

fn transmit_command(
    payload: u32,
    output: &Path,
    clip_dir: &Path,
    bits: u8,
    profile: DeviceProfile,
) -> Result<(), Box<dyn std::error::Error>> {
    let library = DirClipLibrary {
        dir: clip_dir.to_path_buf(),
    };
    let encoder = TransmitEncoder::with_profile(library, profile);

    let mut buffer = encoder.encode(payload, bits)?;
    encoder.lead_in_silence(&mut buffer, 80)?;
    println!(
        "Built transmit buffer: {} bytes for payload {} ({} bits)",
        buffer.len(),
        payload,
        bits
    );

    let file = File::create(output)?;
    let mut writer = hound::WavWriter::new(file, mono_spec())?;
    for pair in buffer.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
    }
    writer.finalize()?;

    println!("Wrote {}", output.display());
    Ok(())
}
