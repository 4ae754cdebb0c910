//! termios-backed serial port.
//!
//! Raw 8N1, no flow control, reads driven by `select(2)` rather than
//! termios timers. Raw platform types stay inside this module; the
//! rest of the crate only sees the [`Channel`] trait and
//! [`SerialError`].

use std::ffi::CString;
use std::io;
use std::mem;
use std::ptr;
use std::time::Duration;

use crate::error::SerialError;

use super::channel::Channel;

/// Empty polls tolerated inside one read before the port is declared
/// dead.
const MAX_POLLS: u32 = 1000;

/// An open serial port configured for latency testing.
///
/// The original termios settings are saved on open and restored when
/// the port is dropped.
pub struct SerialPort {
    fd: libc::c_int,
    saved: libc::termios,
    path: String,
}

impl std::fmt::Debug for SerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPort")
            .field("path", &self.path)
            .field("fd", &self.fd)
            .finish_non_exhaustive()
    }
}

/// Map a numeric baud rate to its termios constant.
///
/// Rates above 230,400 only exist on Linux.
fn baud_constant(baud: u32) -> Option<libc::speed_t> {
    let speed = match baud {
        50 => libc::B50,
        75 => libc::B75,
        110 => libc::B110,
        134 => libc::B134,
        150 => libc::B150,
        200 => libc::B200,
        300 => libc::B300,
        600 => libc::B600,
        1_200 => libc::B1200,
        1_800 => libc::B1800,
        2_400 => libc::B2400,
        4_800 => libc::B4800,
        9_600 => libc::B9600,
        19_200 => libc::B19200,
        38_400 => libc::B38400,
        57_600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        460_800 => libc::B460800,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        500_000 => libc::B500000,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        576_000 => libc::B576000,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        921_600 => libc::B921600,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        1_000_000 => libc::B1000000,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        1_152_000 => libc::B1152000,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        1_500_000 => libc::B1500000,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        2_000_000 => libc::B2000000,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        2_500_000 => libc::B2500000,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        3_000_000 => libc::B3000000,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        3_500_000 => libc::B3500000,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        4_000_000 => libc::B4000000,
        _ => return None,
    };
    Some(speed)
}

impl SerialPort {
    /// Open and configure `path` at `baud`.
    ///
    /// # Errors
    ///
    /// Fails on an unsupported baud rate, an unopenable device node,
    /// or a termios configuration error. The port is left untouched on
    /// failure.
    pub fn open(path: &str, baud: u32) -> Result<Self, SerialError> {
        let speed = baud_constant(baud).ok_or(SerialError::UnsupportedBaud(baud))?;

        let c_path = CString::new(path).map_err(|_| SerialError::Open {
            path: path.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path contains a NUL byte"),
        })?;

        let fd = unsafe { libc::open(c_path.as_ptr(), libc::O_RDWR | libc::O_NOCTTY) };
        if fd < 0 {
            return Err(SerialError::Open {
                path: path.to_string(),
                source: io::Error::last_os_error(),
            });
        }

        let mut saved: libc::termios = unsafe { mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut saved) } < 0 {
            let source = io::Error::last_os_error();
            unsafe { libc::close(fd) };
            return Err(SerialError::Configure {
                path: path.to_string(),
                source,
            });
        }

        // From here on Drop restores the saved settings and closes the
        // descriptor, so configuration errors can just propagate.
        let port = Self {
            fd,
            saved,
            path: path.to_string(),
        };
        port.configure(speed)?;

        #[cfg(any(target_os = "linux", target_os = "android"))]
        port.set_low_latency();

        tracing::debug!(path = %port.path, baud, "serial port configured");
        Ok(port)
    }

    /// Put the port in raw 8N1 mode at `speed` and flush both queues.
    fn configure(&self, speed: libc::speed_t) -> Result<(), SerialError> {
        let mut tio = self.saved;

        unsafe {
            libc::cfsetispeed(&mut tio, speed);
            libc::cfsetospeed(&mut tio, speed);
        }

        // 8N1
        tio.c_cflag &= !(libc::PARENB | libc::CSTOPB | libc::CSIZE);
        tio.c_cflag |= libc::CS8;

        // no hardware or software flow control
        tio.c_cflag &= !libc::CRTSCTS;
        tio.c_iflag &= !(libc::IXON | libc::IXOFF | libc::IXANY);

        tio.c_cflag |= libc::CREAD | libc::CLOCAL;

        // raw input and output
        tio.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ECHOE | libc::ISIG);
        tio.c_oflag &= !libc::OPOST;

        // reads are paced by select(2), not termios timers
        tio.c_cc[libc::VMIN] = 0;
        tio.c_cc[libc::VTIME] = 0;

        if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &tio) } < 0 {
            return Err(self.configure_error());
        }
        if unsafe { libc::tcflush(self.fd, libc::TCIOFLUSH) } < 0 {
            return Err(self.configure_error());
        }
        Ok(())
    }

    fn configure_error(&self) -> SerialError {
        SerialError::Configure {
            path: self.path.clone(),
            source: io::Error::last_os_error(),
        }
    }

    /// Ask the driver for low-latency mode (FTDI "nagling" off).
    ///
    /// Not every driver supports it, so failure is only logged.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn set_low_latency(&self) {
        const TIOCGSERIAL: libc::c_ulong = 0x541E;
        const TIOCSSERIAL: libc::c_ulong = 0x541F;
        const ASYNC_LOW_LATENCY: libc::c_int = 0x2000;

        // struct serial_struct from linux/serial.h; only `flags` is
        // touched, the rest rides along.
        #[repr(C)]
        struct SerialStruct {
            type_: libc::c_int,
            line: libc::c_int,
            port: libc::c_uint,
            irq: libc::c_int,
            flags: libc::c_int,
            xmit_fifo_size: libc::c_int,
            custom_divisor: libc::c_int,
            baud_base: libc::c_int,
            close_delay: libc::c_ushort,
            io_type: libc::c_char,
            reserved_char: [libc::c_char; 1],
            hub6: libc::c_int,
            closing_wait: libc::c_ushort,
            closing_wait2: libc::c_ushort,
            iomem_base: *mut libc::c_uchar,
            iomem_reg_shift: libc::c_ushort,
            port_high: libc::c_uint,
            iomap_base: libc::c_ulong,
        }

        let mut info: SerialStruct = unsafe { mem::zeroed() };
        if unsafe { libc::ioctl(self.fd, TIOCGSERIAL, &mut info) } < 0 {
            tracing::debug!(path = %self.path, "TIOCGSERIAL not supported, skipping low-latency mode");
            return;
        }
        info.flags |= ASYNC_LOW_LATENCY;
        if unsafe { libc::ioctl(self.fd, TIOCSSERIAL, &info) } < 0 {
            tracing::warn!(path = %self.path, "failed to set ASYNC_LOW_LATENCY");
        } else {
            tracing::info!(path = %self.path, "ASYNC_LOW_LATENCY mode set");
        }
    }

    fn set_nonblocking(&self, on: bool) -> io::Result<()> {
        let flags = unsafe { libc::fcntl(self.fd, libc::F_GETFL) };
        if flags < 0 {
            return Err(io::Error::last_os_error());
        }
        let flags = if on {
            flags | libc::O_NONBLOCK
        } else {
            flags & !libc::O_NONBLOCK
        };
        if unsafe { libc::fcntl(self.fd, libc::F_SETFL, flags) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Park in `select(2)` until the port is readable.
    ///
    /// Returns `Ok(false)` on timeout.
    fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
        let mut fds: libc::fd_set = unsafe { mem::zeroed() };
        unsafe {
            libc::FD_ZERO(&mut fds);
            libc::FD_SET(self.fd, &mut fds);
        }
        let mut tv = libc::timeval {
            tv_sec: timeout.as_secs() as libc::time_t,
            tv_usec: timeout.subsec_micros() as libc::suseconds_t,
        };
        let r = unsafe {
            libc::select(
                self.fd + 1,
                &mut fds,
                ptr::null_mut(),
                ptr::null_mut(),
                &mut tv,
            )
        };
        if r < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(r > 0)
    }

    fn read_nonblocking(&self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        let mut count = 0;
        let mut polls = 0u32;

        while count < buf.len() {
            let n = unsafe {
                libc::read(
                    self.fd,
                    buf[count..].as_mut_ptr() as *mut libc::c_void,
                    buf.len() - count,
                )
            };
            if n > 0 {
                count += n as usize;
            } else if n == 0 {
                // nothing buffered; wait for the device
                if !self.wait_readable(timeout)? {
                    return Ok(count);
                }
            } else {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => {
                        if !self.wait_readable(timeout)? {
                            return Ok(count);
                        }
                    }
                    _ => return Err(err),
                }
            }

            polls += 1;
            if polls > MAX_POLLS {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "no input after 1000 polls",
                ));
            }
        }

        Ok(count)
    }
}

impl Channel for SerialPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe { libc::write(self.fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        self.set_nonblocking(true)?;
        let result = self.read_nonblocking(buf, timeout);
        if let Err(err) = self.set_nonblocking(false) {
            tracing::warn!(path = %self.path, "failed to restore blocking mode: {err}");
        }
        result
    }
}

impl Drop for SerialPort {
    fn drop(&mut self) {
        unsafe {
            libc::tcsetattr(self.fd, libc::TCSANOW, &self.saved);
            libc::close(self.fd);
        }
    }
}
