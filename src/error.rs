/*
    dmkfox

    Copyright 2025

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/error.rs

    The error taxonomy shared by every layer of the DMK codec.
*/
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DmkError {
    #[error("An IO error occurred reading or writing the disk image")]
    Io(#[from] std::io::Error),
    #[error("A binary (de)serialization error occurred reading the disk image header")]
    Binrw(#[from] binrw::Error),
    #[error("Geometry error: {0}")]
    Geometry(String),
    #[error("No physical seek has occurred; a current track is required for this operation")]
    NoCurrentTrack,
    #[error("The requested sector ID could not be found on the current track")]
    IdNotFound,
    #[error("A CRC error was detected reading a protected field")]
    CrcMismatch,
    #[error("The track cursor overflowed the track buffer; the handle must not be reused")]
    CursorOverflow,
    #[error("The requested track encoding is not supported by this operation")]
    UnsupportedEncoding,
    #[error("Write-protect status prevents writing to the disk image")]
    WriteProtected,
    #[error("An invalid function parameter was supplied: {0}")]
    Parameter(String),
}

pub type DmkResult<T> = Result<T, DmkError>;
