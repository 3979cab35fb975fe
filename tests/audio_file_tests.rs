// Integration tests for uploaded-file decoding and normalization

use anyhow::Result;
use scribeflow::audio::AudioFile;
use tempfile::TempDir;

fn write_wav(path: &std::path::Path, sample_rate: u32, channels: u16, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_open_reads_format_and_duration() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("mono-16k.wav");

    // 1 second of 16kHz mono
    write_wav(&path, 16000, 1, &vec![100i16; 16000]);

    let audio = AudioFile::open(&path)?;
    assert_eq!(audio.sample_rate, 16000);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.samples.len(), 16000);
    assert!((audio.duration_seconds - 1.0).abs() < 0.001);
    Ok(())
}

#[test]
fn test_already_normalized_audio_passes_through() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("mono-16k.wav");
    write_wav(&path, 16000, 1, &[1, 2, 3, 4, 5]);

    let audio = AudioFile::open(&path)?;
    assert_eq!(audio.resample_to_mono_16khz()?, vec![1, 2, 3, 4, 5]);
    Ok(())
}

#[test]
fn test_stereo_is_downmixed_by_summation() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("stereo-16k.wav");

    // Interleaved L/R pairs
    write_wav(&path, 16000, 2, &[100, 200, -50, 70, i16::MAX, i16::MAX]);

    let audio = AudioFile::open(&path)?;
    let mono = audio.resample_to_mono_16khz()?;

    assert_eq!(mono[0], 300);
    assert_eq!(mono[1], 20);
    assert_eq!(mono[2], i16::MAX, "summation clamps instead of wrapping");
    Ok(())
}

#[test]
fn test_48k_is_decimated_to_16k() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("mono-48k.wav");

    let samples: Vec<i16> = (0..4800).map(|i| (i % 1000) as i16).collect();
    write_wav(&path, 48000, 1, &samples);

    let audio = AudioFile::open(&path)?;
    let mono = audio.resample_to_mono_16khz()?;

    assert_eq!(mono.len(), 1600);
    for (i, &sample) in mono.iter().enumerate() {
        assert_eq!(sample, samples[i * 3], "decimation keeps every 3rd sample");
    }
    Ok(())
}

#[test]
fn test_upsampling_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("mono-8k.wav");
    write_wav(&path, 8000, 1, &[0i16; 800]);

    let audio = AudioFile::open(&path)?;
    assert!(audio.resample_to_mono_16khz().is_err());
    Ok(())
}
