// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Native binary snapshot of a frame, encoded with bincode.
//! Column types, including category dictionaries, survive the round trip.

use crate::error::CodecError;
use crate::frame::Column;
use crate::frame::Frame;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

pub fn write_pickle(frame: &Frame, path: &Path) -> Result<(), CodecError> {
  let mut writer = BufWriter::new(File::create(path)?);
  bincode::serialize_into(&mut writer, frame.columns())?;
  writer.flush()?;
  Ok(())
}

pub fn read_pickle(path: &Path) -> Result<Frame, CodecError> {
  let columns: Vec<Column> = bincode::deserialize_from(BufReader::new(File::open(path)?))?;
  Ok(Frame::new(columns)?)
}
